use crate::discovery::PortScanDiscovery;
use clap::Parser;
use powchain_core::constants::{
    BLOCKCHAIN_PORT_RANGE_END, BLOCKCHAIN_PORT_RANGE_START, DISCOVERY_DIAL_TIMEOUT,
    MINING_DIFFICULTY, MINING_INTERVAL, MINING_REWARD, NEIGHBOR_IP_RANGE_END,
    NEIGHBOR_IP_RANGE_START, PEER_REQUEST_TIMEOUT, PEER_SYNC_INTERVAL,
};
use powchain_core::{ChainConfig, PoolAdmission, Schedule};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "powchain-node")]
#[command(about = "Proof-of-work blockchain node")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(long, default_value = "127.0.0.1:5000")]
    pub listen: SocketAddr,

    /// Address credited with mining rewards [default: the listen address]
    #[arg(long)]
    pub reward_address: Option<String>,

    /// Leading zero hex digits required of each block
    #[arg(long, default_value_t = MINING_DIFFICULTY)]
    pub difficulty: usize,

    /// Value of the per-block mining reward
    #[arg(long, default_value_t = MINING_REWARD)]
    pub reward: f64,

    /// Let submissions reach the pool while a block is being mined
    #[arg(long)]
    pub relaxed_pool: bool,

    /// Serve the chain without mining
    #[arg(long)]
    pub no_mine: bool,

    /// Seconds between mining cycles
    #[arg(long, default_value_t = MINING_INTERVAL.as_secs())]
    pub mining_interval: u64,

    /// Seconds between peer discovery rounds
    #[arg(long, default_value_t = PEER_SYNC_INTERVAL.as_secs())]
    pub peer_sync_interval: u64,

    /// Milliseconds before a peer request is abandoned
    #[arg(long, default_value_t = PEER_REQUEST_TIMEOUT.as_millis() as u64)]
    pub peer_timeout_ms: u64,

    /// Host scanned for peers; the last octet is offset by the IP range
    #[arg(long, default_value = "127.0.0.1")]
    pub discovery_host: Ipv4Addr,

    #[arg(long, default_value_t = BLOCKCHAIN_PORT_RANGE_START)]
    pub port_range_start: u16,

    #[arg(long, default_value_t = BLOCKCHAIN_PORT_RANGE_END)]
    pub port_range_end: u16,

    #[arg(long, default_value_t = NEIGHBOR_IP_RANGE_START)]
    pub ip_range_start: u8,

    #[arg(long, default_value_t = NEIGHBOR_IP_RANGE_END)]
    pub ip_range_end: u8,
}

impl Args {
    pub fn reward_address(&self) -> String {
        self.reward_address
            .clone()
            .unwrap_or_else(|| self.listen.to_string())
    }

    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            difficulty: self.difficulty,
            reward: self.reward,
            admission: if self.relaxed_pool {
                PoolAdmission::Relaxed
            } else {
                PoolAdmission::Strict
            },
        }
    }

    pub fn schedule(&self) -> Schedule {
        Schedule {
            mining_interval: Duration::from_secs(self.mining_interval),
            peer_sync_interval: Duration::from_secs(self.peer_sync_interval),
        }
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }

    pub fn discovery(&self) -> PortScanDiscovery {
        PortScanDiscovery {
            host: self.discovery_host,
            own: self.listen,
            ports: self.port_range_start..=self.port_range_end,
            octets: self.ip_range_start..=self.ip_range_end,
            dial_timeout: DISCOVERY_DIAL_TIMEOUT,
        }
    }
}
