use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinerError {
    #[error("fail to fetch chain: {0:#}")]
    ChainFetch(anyhow::Error),
    #[error("fail to submit chain: {0:#}")]
    ChainSubmit(anyhow::Error),
    #[error("fail to encode chain: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("all workers exited before the round resolved")]
    WorkerPool,
}

pub type MinerResult<T> = Result<T, MinerError>;
