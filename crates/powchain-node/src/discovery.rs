use async_trait::async_trait;
use powchain_core::peers::Discovery;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::ops::RangeInclusive;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

/// Finds peers by dialing every `host + octet offset` × `port` pair and
/// keeping the ones that accept a TCP connection.
#[derive(Clone, Debug)]
pub struct PortScanDiscovery {
    pub host: Ipv4Addr,
    /// This node's own listen address, never reported as a peer.
    pub own: SocketAddr,
    pub ports: RangeInclusive<u16>,
    pub octets: RangeInclusive<u8>,
    pub dial_timeout: Duration,
}

impl PortScanDiscovery {
    fn candidates(&self) -> Vec<SocketAddr> {
        let [a, b, c, d] = self.host.octets();
        let mut out = Vec::new();
        for offset in self.octets.clone() {
            let ip = Ipv4Addr::new(a, b, c, d.wrapping_add(offset));
            for port in self.ports.clone() {
                let addr = SocketAddr::V4(SocketAddrV4::new(ip, port));
                if !self.is_own(&addr) {
                    out.push(addr);
                }
            }
        }
        out
    }

    fn is_own(&self, addr: &SocketAddr) -> bool {
        addr.port() == self.own.port()
            && (addr.ip() == self.own.ip() || self.own.ip().is_unspecified())
    }

    async fn is_listening(&self, addr: SocketAddr) -> bool {
        match timeout(self.dial_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(err)) => {
                debug!(%addr, error = %err, "no peer");
                false
            }
            Err(_) => {
                debug!(%addr, "dial timed out");
                false
            }
        }
    }
}

#[async_trait]
impl Discovery for PortScanDiscovery {
    async fn discover(&self) -> Vec<String> {
        let mut found = Vec::new();
        for addr in self.candidates() {
            if self.is_listening(addr).await {
                found.push(addr.to_string());
            }
        }
        info!(found = ?found, "neighbor search finished");
        found
    }
}
