use serde::{Deserialize, Serialize};

use crate::types::{ClientId, HashRate, UserName};

/// miner -> authority, `POST /status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub username: UserName,
    pub client_id: ClientId,
    pub hashrate: HashRate,
}

impl StatusReport {
    pub fn new(username: UserName, client_id: ClientId, hashrate: HashRate) -> Self {
        Self {
            username,
            client_id,
            hashrate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_report_wire_shape() {
        let report = StatusReport::new(
            UserName("alice".to_string()),
            ClientId("0A1B".to_string()),
            42,
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "username": "alice", "client_id": "0A1B", "hashrate": 42 })
        );
    }
}
