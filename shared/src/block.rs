use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// nonce value the chain authority uses for "not solved yet"
pub const UNSOLVED_NONCE: u64 = 0;

/// length of the identifier taken from the block digest
pub const IDENTIFIER_LEN: usize = 32;

pub type BlockHash = [u8; 32];

/// the chain is index addressed, the first unsolved block is the mining target
pub type Chain = Vec<Block>;

/// text the authority hashes for a missing field
pub const NULL_TEXT: &str = "None";

/// fields the authority may send as `null` stay `None` so a resubmitted chain
/// carries them back unchanged
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub identifier: Option<String>,
    pub nonce: Option<u64>,
    pub data: Option<String>,
    pub previous_hash: Option<String>,
    pub difficulty: u32,
}

impl Block {
    /// an unsolved block carrying `data`
    pub fn new(data: impl Into<String>, difficulty: u32) -> Self {
        Self {
            nonce: Some(UNSOLVED_NONCE),
            data: Some(data.into()),
            difficulty,
            ..Default::default()
        }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// sha256 over identifier, decimal nonce, data and previous hash, in that order.
    ///
    /// The chain authority recomputes the same digest to verify a submitted block,
    /// so neither the field order nor the nonce text encoding may change.
    /// A `None` field is hashed as [`NULL_TEXT`].
    pub fn hash(&self) -> BlockHash {
        let nonce = self.nonce.map(|n| n.to_string());

        let mut hasher = Sha256::new();
        hasher.update(text(&self.identifier));
        hasher.update(text(&nonce));
        hasher.update(text(&self.data));
        hasher.update(text(&self.previous_hash));
        hasher.finalize().into()
    }

    /// lowercase hex form of [`Block::hash`]
    pub fn hex_hash(&self) -> String {
        hex::encode(self.hash())
    }

    pub fn is_solved(&self) -> bool {
        self.nonce.is_some_and(|nonce| nonce != UNSOLVED_NONCE)
    }

    /// derive the identifier from the block as it is right now.
    /// called once before the nonce search starts and never recomputed.
    pub fn assign_identifier(&mut self) {
        let digest = self.hex_hash();
        self.identifier = Some(digest[..IDENTIFIER_LEN].to_uppercase());
    }

    /// link this block to its predecessor
    pub fn chain_to(&mut self, previous: &Block) {
        self.previous_hash = Some(previous.hex_hash());
    }
}

fn text(field: &Option<String>) -> &[u8] {
    field.as_deref().unwrap_or(NULL_TEXT).as_bytes()
}

/// position of the first block still carrying the unsolved sentinel
pub fn first_unsolved(chain: &[Block]) -> Option<usize> {
    chain.iter().position(|block| !block.is_solved())
}
