pub mod blockchain;
pub mod config;
pub mod consensus;
pub mod constants;
pub mod error;
pub mod mine;
pub mod peers;
pub mod pool;
pub mod scheduler;
pub mod signature;
pub mod wire;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

pub use blockchain::Blockchain;
pub use config::{ChainConfig, PoolAdmission, Schedule};
pub use constants::MINING_SENDER;

pub type Hash = [u8; 32];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub value: f64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, value: f64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            value,
        }
    }

    /// A system-issued reward, sent by the mining sentinel.
    pub fn reward(recipient: impl Into<String>, value: f64) -> Self {
        Self::new(MINING_SENDER, recipient, value)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == MINING_SENDER
    }

    /// The bytes a sender signs: compact JSON `{sender, recipient, value}`.
    pub fn signing_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("transaction JSON encoding is infallible")
    }
}

/// An immutable block. Its identity is the SHA-256 of the canonical JSON of
/// its four fields, so none of them can change after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    timestamp: i64,
    nonce: u64,
    #[serde(with = "hex::serde")]
    previous_hash: Hash,
    transactions: Vec<Transaction>,
}

/// Borrowed form of a block used for the canonical encoding. Stored blocks,
/// proof-of-work guesses and peer blocks all hash through this one struct.
#[derive(Serialize)]
struct CanonicalBlock<'a> {
    timestamp: i64,
    nonce: u64,
    #[serde(serialize_with = "hex::serde::serialize")]
    previous_hash: &'a Hash,
    transactions: &'a [Transaction],
}

pub fn digest_parts(
    timestamp: i64,
    nonce: u64,
    previous_hash: &Hash,
    transactions: &[Transaction],
) -> Hash {
    let canonical = CanonicalBlock {
        timestamp,
        nonce,
        previous_hash,
        transactions,
    };
    let mut hasher = Sha256::new();
    serde_json::to_writer(&mut hasher, &canonical).expect("block JSON encoding is infallible");
    hasher.finalize().into()
}

impl Block {
    /// Stamp a new block with the current time.
    pub fn create(nonce: u64, previous_hash: Hash, transactions: Vec<Transaction>) -> Self {
        Self::from_parts(unix_nanos(), nonce, previous_hash, transactions)
    }

    pub fn from_parts(
        timestamp: i64,
        nonce: u64,
        previous_hash: Hash,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            timestamp,
            nonce,
            previous_hash,
            transactions,
        }
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn previous_hash(&self) -> &Hash {
        &self.previous_hash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn hash(&self) -> Hash {
        digest_parts(
            self.timestamp,
            self.nonce,
            &self.previous_hash,
            &self.transactions,
        )
    }
}

fn unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as i64)
        .unwrap_or_default()
}

pub mod pow {
    use super::{digest_parts, Hash, Transaction};

    /// Search nonces from 0 upward until the candidate hash has `difficulty`
    /// leading zero hex digits. Blocking and unbounded.
    pub fn find_nonce(previous_hash: &Hash, transactions: &[Transaction], difficulty: usize) -> u64 {
        let mut nonce = 0u64;
        while !valid_proof(nonce, previous_hash, transactions, difficulty) {
            nonce = nonce.wrapping_add(1);
        }
        nonce
    }

    /// The candidate is hashed with timestamp 0, so the proof commits to the
    /// nonce, the parent and the transactions but not to the creation time.
    pub fn valid_proof(
        nonce: u64,
        previous_hash: &Hash,
        transactions: &[Transaction],
        difficulty: usize,
    ) -> bool {
        let guess = digest_parts(0, nonce, previous_hash, transactions);
        count_leading_zero_nibbles(&guess) >= difficulty
    }

    pub fn count_leading_zero_nibbles(hash: &Hash) -> usize {
        let mut total = 0usize;
        for b in hash {
            if *b == 0 {
                total += 2;
            } else {
                if *b < 0x10 {
                    total += 1;
                }
                break;
            }
        }
        total
    }
}

pub mod chain {
    use super::{Block, Hash};

    /// Hash of `{timestamp 0, nonce 0, zeroed parent, no transactions}`.
    pub fn empty_block_hash() -> Hash {
        Block::from_parts(0, 0, [0u8; 32], vec![]).hash()
    }

    /// Every node starts from this same block; it is exempt from the
    /// difficulty check.
    pub fn genesis_block() -> Block {
        Block::from_parts(0, 0, empty_block_hash(), vec![])
    }
}
