use std::{fs::File, io, path::Path};

use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::types::{ClientId, UserName};
use thiserror::Error;

pub const PLACEHOLDER_USERNAME: &str = "CHANGE_ME";

const CLIENT_ID_LEN: usize = 32;
const HEX_DIGITS: &[u8] = b"0123456789ABCDEF";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MinerConfig {
    pub username: UserName,
    pub client_id: ClientId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("a new config file was written to {0}, set your username in it and start again")]
    Created(String),
    #[error("username in {0} is still the placeholder, set your username and start again")]
    Placeholder(String),
    #[error("config file {0}: {1}")]
    Io(String, io::Error),
    #[error("config file {0} is not valid: {1}")]
    Parse(String, serde_json::Error),
}

impl ConfigError {
    /// the operator has to edit the file, nothing is wrong with the process
    pub fn needs_operator(&self) -> bool {
        matches!(self, ConfigError::Created(_) | ConfigError::Placeholder(_))
    }
}

impl MinerConfig {
    pub fn placeholder() -> Self {
        Self {
            username: UserName(PLACEHOLDER_USERNAME.to_string()),
            client_id: generate_client_id(),
            max_workers: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.username.as_str().trim().is_empty() || self.username.as_str() == PLACEHOLDER_USERNAME
    }
}

/// random uppercase hex id identifying this installation to the authority
pub fn generate_client_id() -> ClientId {
    let mut rng = rand::thread_rng();
    let id = (0..CLIENT_ID_LEN)
        .map(|_| HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())] as char)
        .collect();
    ClientId(id)
}

/// load the config file, writing a placeholder one on first run
pub fn load_config_file<P>(config_file: P) -> Result<MinerConfig, ConfigError>
where
    P: AsRef<Path>, {
    let path = config_file.as_ref();
    let name = path.display().to_string();

    if !path.exists() {
        let file = File::create(path).map_err(|err| ConfigError::Io(name.clone(), err))?;
        serde_json::to_writer_pretty(file, &MinerConfig::placeholder())
            .map_err(|err| ConfigError::Parse(name.clone(), err))?;
        return Err(ConfigError::Created(name));
    }

    let file = File::open(path).map_err(|err| ConfigError::Io(name.clone(), err))?;
    let config: MinerConfig =
        serde_json::from_reader(file).map_err(|err| ConfigError::Parse(name.clone(), err))?;

    if config.is_placeholder() {
        return Err(ConfigError::Placeholder(name));
    }
    Ok(config)
}
