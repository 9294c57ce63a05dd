use thiserror::Error;

/// Failure talking to a single peer. Never fatal: the peer is skipped for the
/// current round.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("peer {peer} unreachable: {reason}")]
    Transport { peer: String, reason: String },
    #[error("peer {peer} answered with status {status}")]
    Status { peer: String, status: u16 },
    #[error("peer {peer} sent an undecodable payload: {reason}")]
    Decode { peer: String, reason: String },
}

/// Malformed key or signature material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("rejected PKCS#8 key material")]
    Pkcs8,
}

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("key generation failed")]
    KeyGeneration,
    #[error("signing failed")]
    Sign,
}

#[derive(Debug, Error)]
pub enum MiningError {
    #[error("proof-of-work task did not complete: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}
