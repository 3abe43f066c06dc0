use shared::{
    block::Block,
    errors::{MinerError, MinerResult},
    types::HashRate,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::*;

use crate::thread::WorkerMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Solved(Block),
    /// every worker timed out, `hashrate` is the sum of their samples
    Exhausted { hashrate: HashRate, samples: usize },
}

/// collects the messages of one round of workers
pub struct Container {
    size: usize,
    samples: Vec<HashRate>,
}

impl Container {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            samples: Vec::with_capacity(size),
        }
    }

    /// push a worker message, returns the outcome once the round is resolved.
    /// the first solution wins no matter how many samples came before it.
    pub fn push(&mut self, message: WorkerMessage) -> Option<RoundOutcome> {
        match message {
            WorkerMessage::Solved(block) => Some(RoundOutcome::Solved(block)),
            WorkerMessage::HashRate(rate) => {
                self.samples.push(rate);
                if self.samples.len() >= self.size {
                    Some(RoundOutcome::Exhausted {
                        hashrate: self.total(),
                        samples: self.samples.len(),
                    })
                } else {
                    None
                }
            }
        }
    }

    pub fn total(&self) -> HashRate {
        self.samples.iter().sum()
    }

    // wait until the round resolves
    pub async fn monitor(
        &mut self,
        receiver: &mut UnboundedReceiver<WorkerMessage>,
    ) -> MinerResult<RoundOutcome> {
        while let Some(message) = receiver.recv().await {
            if let Some(outcome) = self.push(message) {
                return Ok(outcome);
            }
        }

        error!("worker channel closed, received {}/{} results", self.samples.len(), self.size);
        Err(MinerError::WorkerPool)
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;

    fn solved() -> Block {
        Block::new("solved", 1).with_nonce(77)
    }

    #[test]
    fn samples_sum_once_every_worker_reported() {
        let mut container = Container::new(4);
        assert_eq!(container.push(WorkerMessage::HashRate(10)), None);
        assert_eq!(container.push(WorkerMessage::HashRate(12)), None);
        assert_eq!(container.push(WorkerMessage::HashRate(9)), None);
        assert_eq!(
            container.push(WorkerMessage::HashRate(11)),
            Some(RoundOutcome::Exhausted {
                hashrate: 42,
                samples: 4
            })
        );
    }

    #[test]
    fn solution_preempts_pending_samples() {
        let mut container = Container::new(3);
        assert_eq!(container.push(WorkerMessage::HashRate(5)), None);
        assert_eq!(container.push(WorkerMessage::HashRate(5)), None);
        assert_eq!(
            container.push(WorkerMessage::Solved(solved())),
            Some(RoundOutcome::Solved(solved()))
        );
    }

    #[tokio::test]
    async fn monitor_returns_first_solution() {
        let (tx, mut rx) = unbounded_channel();
        tx.send(WorkerMessage::HashRate(3)).unwrap();
        tx.send(WorkerMessage::Solved(solved())).unwrap();
        tx.send(WorkerMessage::HashRate(4)).unwrap();

        let outcome = Container::new(3).monitor(&mut rx).await.unwrap();
        assert_eq!(outcome, RoundOutcome::Solved(solved()));
    }

    #[tokio::test]
    async fn monitor_fails_when_workers_vanish() {
        let (tx, mut rx) = unbounded_channel();
        tx.send(WorkerMessage::HashRate(3)).unwrap();
        drop(tx);

        let res = Container::new(2).monitor(&mut rx).await;
        assert!(matches!(res, Err(MinerError::WorkerPool)));
    }
}
