use std::{
    thread::JoinHandle,
    time::{Duration, Instant},
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::{block::Block, difficulty::meets_difficulty, types::HashRate};
use tokio::sync::mpsc::UnboundedSender;
use tracing::*;

/// smallest nonce a worker draws, `0` is the authority's unsolved marker
pub const MIN_NONCE: u64 = 1;
pub const MAX_NONCE: u64 = u32::MAX as u64;

/// exactly one of these is sent by every worker before it exits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerMessage {
    Solved(Block),
    HashRate(HashRate),
}

pub struct NonceWorker {
    pub id: usize,
    pub block: Block,
    pub interval: Duration,
    pub sender: UnboundedSender<WorkerMessage>,
}

impl NonceWorker {
    /// detach a search thread. Nobody joins it, a late result sent after the
    /// round resolved is dropped with the receiver.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new().name(format!("nonce-worker-{}", self.id)).spawn(move || {
            // bound thread to core
            let cores = core_affinity::get_core_ids().unwrap_or_default();
            if !cores.is_empty() {
                let _ = core_affinity::set_for_current(cores[self.id % cores.len()]);
            }

            let message = self.search();
            // receiver may already be gone
            self.sender.send(message).ok();
        })
    }

    /// random nonce search on a private copy of the block until solved or the interval ends
    pub fn search(&self) -> WorkerMessage {
        let mut rng = StdRng::from_entropy();
        let mut block = self.block.clone();
        let difficulty = block.difficulty;
        let stop_time = Instant::now() + self.interval;
        let mut hashes: u64 = 0;

        loop {
            let nonce = rng.gen_range(MIN_NONCE..=MAX_NONCE);
            block.nonce = Some(nonce);
            let digest = block.hex_hash();
            hashes += 1;

            if meets_difficulty(&digest, difficulty) {
                debug!("worker: {}, nonce: {nonce}, digest: {digest}", self.id);
                return WorkerMessage::Solved(block);
            }

            if stop_time.le(&Instant::now()) {
                break;
            }
        }

        let hashrate = hash_rate(hashes, self.interval);
        trace!("worker: {}, hashes: {hashes}, rate: {hashrate} H/s", self.id);
        WorkerMessage::HashRate(hashrate)
    }
}

/// hashes per second over the configured interval
pub fn hash_rate(hashes: u64, interval: Duration) -> HashRate {
    let secs = interval.as_secs_f64();
    if secs <= 0.0 {
        return hashes;
    }
    (hashes as f64 / secs) as HashRate
}
