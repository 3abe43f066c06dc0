pub mod block;
pub mod difficulty;
pub mod errors;
pub mod interaction;
pub mod log;
pub mod types;
pub mod utils;
