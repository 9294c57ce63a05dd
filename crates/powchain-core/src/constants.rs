use std::time::Duration;

pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const PUBLIC_KEY_SIZE: usize = 64;
pub const SIGNATURE_SIZE: usize = 64;

pub const MINING_DIFFICULTY: usize = 3;
pub const MINING_SENDER: &str = "THE BLOCKCHAIN";
pub const MINING_REWARD: f64 = 1.0;
pub const MINING_INTERVAL: Duration = Duration::from_secs(20);

pub const PEER_SYNC_INTERVAL: Duration = Duration::from_secs(20);
pub const PEER_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DISCOVERY_DIAL_TIMEOUT: Duration = Duration::from_secs(1);

pub const BLOCKCHAIN_PORT_RANGE_START: u16 = 5000;
pub const BLOCKCHAIN_PORT_RANGE_END: u16 = 5003;
pub const NEIGHBOR_IP_RANGE_START: u8 = 0;
pub const NEIGHBOR_IP_RANGE_END: u8 = 1;
