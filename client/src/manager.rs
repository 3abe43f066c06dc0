use std::time::Duration;

use shared::{
    block::{first_unsolved, Block, Chain, UNSOLVED_NONCE},
    difficulty::{difficulty_target, requires_work},
    errors::{MinerError, MinerResult},
    types::HashRate,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::*;

use crate::{
    container::{Container, RoundOutcome},
    thread::NonceWorker,
};

pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub struct MinerSettings {
    pub max_workers: usize,
    pub report_interval: Duration,
}

impl Default for MinerSettings {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

/// block picked for mining with identifier and previous hash already fixed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub index: usize,
    pub block: Block,
}

#[derive(Debug)]
pub enum MineOutcome {
    /// nothing left to solve on this chain
    NoWork,
    Solved(Chain),
}

pub struct CoreManager {
    settings: MinerSettings,
    hashrate_tx: UnboundedSender<HashRate>,
}

impl CoreManager {
    pub fn new(settings: MinerSettings, hashrate_tx: UnboundedSender<HashRate>) -> Self {
        Self {
            settings: MinerSettings {
                max_workers: settings.max_workers.max(1),
                ..settings
            },
            hashrate_tx,
        }
    }

    pub fn settings(&self) -> &MinerSettings {
        &self.settings
    }

    /// first unsolved block, prepared for the search.
    /// `None` when the chain is solved or the next block asks for no work.
    pub fn select_target(chain: &[Block]) -> Option<Target> {
        let index = first_unsolved(chain)?;
        let mut block = chain[index].clone();
        if !requires_work(block.difficulty) {
            return None;
        }

        block.assign_identifier();
        if index > 0 {
            block.chain_to(&chain[index - 1]);
        }

        Some(Target { index, block })
    }

    /// mine the chain until the target block is solved, round after round
    pub async fn mine(&self, mut chain: Chain) -> MinerResult<MineOutcome> {
        let Some(target) = Self::select_target(&chain) else {
            info!("no unsolved block left in a chain of {} blocks", chain.len());
            return Ok(MineOutcome::NoWork);
        };

        info!(
            "working on block number {} at difficulty rating {} (target `{}`)",
            target.index,
            target.block.difficulty,
            difficulty_target(target.block.difficulty)
        );

        let mut round = 0u64;
        loop {
            round += 1;
            match self.run_round(&target.block).await? {
                RoundOutcome::Solved(block) => {
                    info!(
                        "block {} solved in round {round}, nonce: {}, hash: {}",
                        target.index,
                        block.nonce.unwrap_or(UNSOLVED_NONCE),
                        block.hex_hash()
                    );
                    chain[target.index] = block;
                    return Ok(MineOutcome::Solved(chain));
                }
                RoundOutcome::Exhausted { hashrate, samples } => {
                    info!("round {round} exhausted, mining power: {hashrate} H/s ({samples} workers)");
                    if let Err(err) = self.hashrate_tx.send(hashrate) {
                        warn!("status reporter is gone: {err}");
                    }
                }
            }
        }
    }

    /// one dispatch of the worker pool against a fixed block
    pub async fn run_round(&self, block: &Block) -> MinerResult<RoundOutcome> {
        let (result_tx, mut result_rx) = unbounded_channel();

        let mut spawned = 0;
        for id in 0..self.settings.max_workers {
            let worker = NonceWorker {
                id,
                block: block.clone(),
                interval: self.settings.report_interval,
                sender: result_tx.clone(),
            };
            match worker.spawn() {
                Ok(_) => spawned += 1,
                Err(err) => error!("fail to spawn worker {id}: {err}"),
            }
        }
        // only workers hold senders now, a closed channel means they all exited
        drop(result_tx);

        if spawned == 0 {
            return Err(MinerError::WorkerPool);
        }

        debug!("round dispatched to {spawned} workers, interval: {:?}", self.settings.report_interval);
        Container::new(spawned).monitor(&mut result_rx).await
    }
}
