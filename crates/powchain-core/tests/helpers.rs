use async_trait::async_trait;
use powchain_core::error::PeerError;
use powchain_core::peers::{PeerClient, PeerNotice};
use powchain_core::signature::{SignedTransfer, Submission};
use powchain_core::{Block, Blockchain, ChainConfig};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A node with no reachable peers.
pub struct Offline;

#[async_trait]
impl PeerClient for Offline {
    async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, PeerError> {
        Err(PeerError::Transport {
            peer: peer.to_string(),
            reason: "offline".into(),
        })
    }

    async fn notify(&self, peer: &str, _notice: &PeerNotice) -> Result<(), PeerError> {
        Err(PeerError::Transport {
            peer: peer.to_string(),
            reason: "offline".into(),
        })
    }
}

/// Routes peer calls straight into other in-process nodes.
#[derive(Default)]
pub struct Linked {
    nodes: Mutex<HashMap<String, Arc<Blockchain<Offline>>>>,
}

impl Linked {
    pub fn link(&self, addr: &str, node: Arc<Blockchain<Offline>>) {
        self.nodes.lock().unwrap().insert(addr.to_string(), node);
    }

    fn node(&self, peer: &str) -> Result<Arc<Blockchain<Offline>>, PeerError> {
        self.nodes
            .lock()
            .unwrap()
            .get(peer)
            .cloned()
            .ok_or_else(|| PeerError::Transport {
                peer: peer.to_string(),
                reason: "connection refused".into(),
            })
    }
}

#[async_trait]
impl PeerClient for Linked {
    async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, PeerError> {
        Ok(self.node(peer)?.chain().await)
    }

    async fn notify(&self, peer: &str, notice: &PeerNotice) -> Result<(), PeerError> {
        let node = self.node(peer)?;
        match notice {
            PeerNotice::ClearTransactions => node.clear_transactions().await,
            PeerNotice::ResolveConflicts => {
                node.resolve_conflicts().await;
            }
            PeerNotice::RelayTransaction(request) => {
                let transfer = SignedTransfer::try_from(request.clone()).map_err(|err| {
                    PeerError::Decode {
                        peer: peer.to_string(),
                        reason: err.to_string(),
                    }
                })?;
                node.add_transaction(Submission::Transfer(transfer)).await;
            }
        }
        Ok(())
    }
}

pub fn offline_node(reward_address: &str) -> Arc<Blockchain<Offline>> {
    Arc::new(Blockchain::new(
        reward_address,
        ChainConfig::default(),
        Offline,
    ))
}

pub fn linked_node(reward_address: &str) -> Arc<Blockchain<Linked>> {
    Arc::new(Blockchain::new(
        reward_address,
        ChainConfig::default(),
        Linked::default(),
    ))
}
