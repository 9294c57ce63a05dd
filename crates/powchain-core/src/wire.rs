//! JSON bodies of the node's HTTP interface, shared by the server, the peer
//! client and the wallet CLI.

use crate::{Block, Transaction};
use serde::{Deserialize, Serialize};

/// `GET /chain`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
}

/// `GET /chain/head`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeadResponse {
    pub height: usize,
    pub hash: String,
}

/// `GET /transactions`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
    pub length: usize,
}

/// Outcome of a submission or pool operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `POST /transactions`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    pub relayed: usize,
    pub relay_failures: usize,
}

/// `PUT /consensus`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResponse {
    pub replaced: bool,
}

/// `GET /mine`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineResponse {
    pub height: usize,
    pub hash: String,
    pub notified: usize,
    pub failed: usize,
}

/// `GET /amount`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmountResponse {
    pub amount: f64,
}
