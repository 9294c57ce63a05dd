use crate::constants::{MINING_DIFFICULTY, MINING_INTERVAL, MINING_REWARD, PEER_SYNC_INTERVAL};
use std::time::Duration;

/// How pool mutations relate to the mining lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PoolAdmission {
    /// Submissions and clears wait for an in-flight mining cycle.
    #[default]
    Strict,
    /// Submissions only take the pool lock and may land mid-cycle; they are
    /// picked up by the next cycle.
    Relaxed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChainConfig {
    /// Leading zero hex digits required of a block's proof.
    pub difficulty: usize,
    pub reward: f64,
    pub admission: PoolAdmission,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: MINING_DIFFICULTY,
            reward: MINING_REWARD,
            admission: PoolAdmission::default(),
        }
    }
}

/// Delays between runs of the periodic node activities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    pub mining_interval: Duration,
    pub peer_sync_interval: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            mining_interval: MINING_INTERVAL,
            peer_sync_interval: PEER_SYNC_INTERVAL,
        }
    }
}
