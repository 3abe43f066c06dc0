use std::sync::Arc;

use shared::{
    interaction::StatusReport,
    types::{ClientId, HashRate, UserName},
};
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tracing::*;

use crate::restful::ChainStore;

/// relays round hash rates to the authority, independent of the mining cycle
pub struct StatusReporter {
    store: Arc<dyn ChainStore>,
    username: UserName,
    client_id: ClientId,
}

impl StatusReporter {
    pub fn new(store: Arc<dyn ChainStore>, username: UserName, client_id: ClientId) -> Self {
        Self {
            store,
            username,
            client_id,
        }
    }

    /// runs until every hash rate sender is dropped
    pub fn start(self, mut receiver: UnboundedReceiver<HashRate>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(hashrate) = receiver.recv().await {
                self.report(hashrate).await;
            }
            debug!("[reporter] hash rate channel closed");
        })
    }

    /// failures are logged and never stop the reporter
    pub async fn report(&self, hashrate: HashRate) {
        let report = StatusReport::new(self.username.clone(), self.client_id.clone(), hashrate);
        match self.store.post_status(&report).await {
            Ok(body) => debug!("status {hashrate} H/s sent: {body}"),
            Err(err) => error!("fail to send status: {err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use shared::block::Chain;
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;

    /// fails every other status post
    #[derive(Default)]
    struct FlakyStatusStore {
        posted: Mutex<Vec<StatusReport>>,
    }

    #[async_trait]
    impl ChainStore for FlakyStatusStore {
        async fn fetch_chain(&self) -> anyhow::Result<Chain> {
            anyhow::bail!("unused")
        }

        async fn submit_chain(&self, _payload: String) -> anyhow::Result<String> {
            anyhow::bail!("unused")
        }

        async fn post_status(&self, report: &StatusReport) -> anyhow::Result<String> {
            let mut guard = self.posted.lock().unwrap();
            guard.push(report.clone());
            if guard.len() % 2 == 1 {
                anyhow::bail!("status code: 500, response: error updating status");
            }
            Ok("status updated".to_string())
        }
    }

    #[tokio::test]
    async fn keeps_reporting_after_failures() {
        let store = Arc::new(FlakyStatusStore::default());
        let reporter = StatusReporter::new(
            store.clone(),
            UserName("alice".to_string()),
            ClientId("5F0C".to_string()),
        );

        let (tx, rx) = unbounded_channel();
        let handle = reporter.start(rx);
        for rate in [42, 40, 44] {
            tx.send(rate).unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        let posted = store.posted.lock().unwrap();
        let rates: Vec<_> = posted.iter().map(|r| r.hashrate).collect();
        assert_eq!(rates, vec![42, 40, 44]);
        assert!(posted.iter().all(|r| r.username.as_str() == "alice"));
        assert!(posted.iter().all(|r| r.client_id.as_str() == "5F0C"));
    }
}
