use crate::chain::{empty_block_hash, genesis_block};
use crate::config::{ChainConfig, PoolAdmission};
use crate::peers::{broadcast, BroadcastReport, PeerClient, PeerNotice, PeerSet};
use crate::pool::TransactionPool;
use crate::signature::{SignedTransfer, Submission};
use crate::{Block, Hash, Transaction};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info};

/// The node aggregate: chain, pool, reward address and peer set.
///
/// Lock order is `cycle` → `chain` → `pool`. `cycle` is held for a whole
/// mining cycle and for every chain replacement; the peer set has its own
/// lock and is never taken together with the others.
pub struct Blockchain<C> {
    pub(crate) chain: RwLock<Vec<Block>>,
    pub(crate) pool: Mutex<TransactionPool>,
    pub(crate) cycle: Mutex<()>,
    peers: PeerSet,
    pub(crate) client: C,
    reward_address: String,
    pub(crate) config: ChainConfig,
}

impl<C: PeerClient> Blockchain<C> {
    pub fn new(reward_address: impl Into<String>, config: ChainConfig, client: C) -> Self {
        Self {
            chain: RwLock::new(vec![genesis_block()]),
            pool: Mutex::new(TransactionPool::new()),
            cycle: Mutex::new(()),
            peers: PeerSet::default(),
            client,
            reward_address: reward_address.into(),
            config,
        }
    }

    pub fn reward_address(&self) -> &str {
        &self.reward_address
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn chain(&self) -> Vec<Block> {
        self.chain.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.chain.read().await.len()
    }

    pub async fn last_block(&self) -> Option<Block> {
        self.chain.read().await.last().cloned()
    }

    /// Hash the next block must point at.
    pub async fn tip_hash(&self) -> Hash {
        self.chain
            .read()
            .await
            .last()
            .map(Block::hash)
            .unwrap_or_else(empty_block_hash)
    }

    /// Height and hash of the last block.
    pub async fn head(&self) -> (usize, Hash) {
        let chain = self.chain.read().await;
        match chain.last() {
            Some(block) => (chain.len() - 1, block.hash()),
            None => (0, empty_block_hash()),
        }
    }

    /// Pending transactions, oldest first.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.pool.lock().await.snapshot()
    }

    /// In strict mode pool writers queue behind the mining cycle.
    async fn admission_guard(&self) -> Option<MutexGuard<'_, ()>> {
        match self.config.admission {
            PoolAdmission::Strict => Some(self.cycle.lock().await),
            PoolAdmission::Relaxed => None,
        }
    }

    /// Verify and pool a submission. Returns whether it was accepted.
    pub async fn add_transaction(&self, submission: Submission) -> bool {
        let Some(tx) = submission.admit() else {
            return false;
        };
        let _guard = self.admission_guard().await;
        let mut pool = self.pool.lock().await;
        debug!(sender = %tx.sender, recipient = %tx.recipient, value = tx.value, "transaction pooled");
        pool.add(tx);
        true
    }

    /// Pool a client transfer and relay it to every known peer. `None` when
    /// the transfer is rejected; nothing is relayed then.
    pub async fn create_transaction(&self, transfer: SignedTransfer) -> Option<BroadcastReport> {
        let request = transfer.to_request();
        if !self.add_transaction(Submission::Transfer(transfer)).await {
            return None;
        }
        let peers = self.peers.snapshot().await;
        Some(broadcast(&self.client, &peers, &PeerNotice::RelayTransaction(request)).await)
    }

    pub async fn clear_transactions(&self) {
        let _guard = self.admission_guard().await;
        let mut pool = self.pool.lock().await;
        info!(dropped = pool.len(), "transaction pool cleared");
        pool.clear();
    }

    /// Received minus sent over every confirmed transaction.
    pub async fn total_amount(&self, address: &str) -> f64 {
        let chain = self.chain.read().await;
        let mut total = 0.0;
        for tx in chain.iter().flat_map(|b| b.transactions()) {
            if tx.recipient == address {
                total += tx.value;
            }
            if tx.sender == address {
                total -= tx.value;
            }
        }
        total
    }
}
