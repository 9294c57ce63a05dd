use crate::error::PeerError;
use crate::signature::TransferRequest;
use crate::Block;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A fire-once message to a peer.
#[derive(Clone, Debug, PartialEq)]
pub enum PeerNotice {
    /// `DELETE /transactions`
    ClearTransactions,
    /// `PUT /consensus`
    ResolveConflicts,
    /// `PUT /transactions`
    RelayTransaction(TransferRequest),
}

/// How the node reaches its peers. Implementations bound every call with a
/// timeout and never retry.
#[async_trait]
pub trait PeerClient: Send + Sync {
    async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, PeerError>;

    async fn notify(&self, peer: &str, notice: &PeerNotice) -> Result<(), PeerError>;
}

/// Produces the current peer address list (`"host:port"`).
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn discover(&self) -> Vec<String>;
}

/// Known peer addresses. Guarded on its own; readers may see a stale list.
#[derive(Debug, Default)]
pub struct PeerSet {
    addrs: RwLock<Vec<String>>,
}

impl PeerSet {
    pub fn new(addrs: Vec<String>) -> Self {
        Self {
            addrs: RwLock::new(addrs),
        }
    }

    pub async fn replace(&self, addrs: Vec<String>) {
        *self.addrs.write().await = addrs;
    }

    pub async fn snapshot(&self) -> Vec<String> {
        self.addrs.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.addrs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.addrs.read().await.is_empty()
    }
}

/// Outcome of a best-effort fan-out.
#[derive(Debug, Default)]
pub struct BroadcastReport {
    pub delivered: Vec<String>,
    pub failed: Vec<(String, PeerError)>,
}

impl BroadcastReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn merge(&mut self, other: BroadcastReport) {
        self.delivered.extend(other.delivered);
        self.failed.extend(other.failed);
    }
}

/// Send `notice` to each peer in turn. Failures are logged and recorded,
/// never retried.
pub async fn broadcast<C: PeerClient + ?Sized>(
    client: &C,
    peers: &[String],
    notice: &PeerNotice,
) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    for peer in peers {
        match client.notify(peer, notice).await {
            Ok(()) => {
                debug!(%peer, ?notice, "peer notified");
                report.delivered.push(peer.clone());
            }
            Err(err) => {
                warn!(%peer, error = %err, "peer notification failed");
                report.failed.push((peer.clone(), err));
            }
        }
    }
    report
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory peers keyed by address. Unknown addresses are unreachable.
    #[derive(Default)]
    pub struct MemoryPeers {
        pub chains: Mutex<HashMap<String, Vec<Block>>>,
        pub garbled: Mutex<Vec<String>>,
        pub notices: Mutex<Vec<(String, PeerNotice)>>,
    }

    impl MemoryPeers {
        pub fn serve(&self, peer: &str, chain: Vec<Block>) {
            self.chains.lock().unwrap().insert(peer.to_string(), chain);
        }

        pub fn garble(&self, peer: &str) {
            self.garbled.lock().unwrap().push(peer.to_string());
        }

        pub fn notices(&self) -> Vec<(String, PeerNotice)> {
            self.notices.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PeerClient for MemoryPeers {
        async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, PeerError> {
            if self.garbled.lock().unwrap().iter().any(|p| p == peer) {
                return Err(PeerError::Decode {
                    peer: peer.to_string(),
                    reason: "expected value at line 1 column 1".into(),
                });
            }
            self.chains
                .lock()
                .unwrap()
                .get(peer)
                .cloned()
                .ok_or_else(|| PeerError::Transport {
                    peer: peer.to_string(),
                    reason: "connection refused".into(),
                })
        }

        async fn notify(&self, peer: &str, notice: &PeerNotice) -> Result<(), PeerError> {
            if !self.chains.lock().unwrap().contains_key(peer) {
                return Err(PeerError::Transport {
                    peer: peer.to_string(),
                    reason: "connection refused".into(),
                });
            }
            self.notices
                .lock()
                .unwrap()
                .push((peer.to_string(), notice.clone()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryPeers;
    use super::*;
    use crate::chain::genesis_block;

    #[tokio::test]
    async fn peer_set_replace_and_snapshot() {
        let peers = PeerSet::default();
        assert!(peers.is_empty().await);
        peers
            .replace(vec!["127.0.0.1:5001".into(), "127.0.0.1:5002".into()])
            .await;
        assert_eq!(peers.len().await, 2);
        assert_eq!(
            peers.snapshot().await,
            vec!["127.0.0.1:5001".to_string(), "127.0.0.1:5002".to_string()]
        );
    }

    #[tokio::test]
    async fn broadcast_records_each_outcome() {
        let client = MemoryPeers::default();
        client.serve("up:1", vec![genesis_block()]);
        let peers = vec!["up:1".to_string(), "down:2".to_string()];

        let report = broadcast(&client, &peers, &PeerNotice::ResolveConflicts).await;

        assert_eq!(report.delivered, vec!["up:1".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "down:2");
        assert!(!report.all_delivered());
        assert_eq!(
            client.notices(),
            vec![("up:1".to_string(), PeerNotice::ResolveConflicts)]
        );
    }
}
