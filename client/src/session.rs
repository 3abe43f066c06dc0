use std::{sync::Arc, time::Duration};

use shared::{
    errors::{MinerError, MinerResult},
    utils::{retry, RetryPolicy},
};
use tracing::*;

use crate::{
    manager::{CoreManager, MineOutcome},
    restful::ChainStore,
};

pub const FETCH_BACKOFF: Duration = Duration::from_secs(10);

/// fetch -> mine -> submit, until the authority has nothing left to solve
pub struct Session {
    store: Arc<dyn ChainStore>,
    manager: CoreManager,
    fetch_policy: RetryPolicy,
}

impl Session {
    pub fn new(store: Arc<dyn ChainStore>, manager: CoreManager) -> Self {
        Self {
            store,
            manager,
            fetch_policy: RetryPolicy::forever(FETCH_BACKOFF),
        }
    }

    pub fn with_fetch_policy(mut self, policy: RetryPolicy) -> Self {
        self.fetch_policy = policy;
        self
    }

    /// returns `Ok` once no unsolved block remains.
    /// a failed submit or encode ends the session with an error, solved work would be lost otherwise.
    pub async fn run(&self) -> MinerResult<()> {
        let store = self.store.as_ref();
        let mut submitted = 0u64;
        loop {
            let chain = retry(&self.fetch_policy, "fetch chain", move || store.fetch_chain())
                .await
                .map_err(MinerError::ChainFetch)?;
            debug!("fetched chain of {} blocks", chain.len());

            match self.manager.mine(chain).await? {
                MineOutcome::NoWork => {
                    info!("chain complete, {submitted} blocks submitted in this session");
                    return Ok(());
                }
                MineOutcome::Solved(chain) => {
                    let payload = serde_json::to_string(&chain)?;
                    let body =
                        store.submit_chain(payload).await.map_err(MinerError::ChainSubmit)?;
                    submitted += 1;
                    info!("chain authority: {}", body.trim());
                }
            }
        }
    }
}
