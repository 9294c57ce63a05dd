use crate::config::PoolAdmission;
use crate::error::MiningError;
use crate::peers::{broadcast, BroadcastReport, PeerClient, PeerNotice};
use crate::{pow, Block, Blockchain, Transaction};
use tracing::info;

/// Result of one successful mining cycle.
#[derive(Debug)]
pub struct MinedBlock {
    pub block: Block,
    /// Index of the new block in the chain.
    pub height: usize,
    pub notified: BroadcastReport,
}

impl<C: PeerClient> Blockchain<C> {
    /// Run one exclusive mining cycle: reward, snapshot, search, append,
    /// reset the pool, then tell peers to clear their pools and re-run
    /// consensus.
    pub async fn mine(&self) -> Result<MinedBlock, MiningError> {
        let cycle = self.cycle.lock().await;

        let snapshot = {
            let mut pool = self.pool.lock().await;
            pool.add(Transaction::reward(
                self.reward_address(),
                self.config.reward,
            ));
            pool.snapshot()
        };
        let previous_hash = self.tip_hash().await;
        let difficulty = self.config.difficulty;

        let search = snapshot.clone();
        let nonce = tokio::task::spawn_blocking(move || {
            pow::find_nonce(&previous_hash, &search, difficulty)
        })
        .await?;

        let (block, height) = {
            let mut chain = self.chain.write().await;
            let mut pool = self.pool.lock().await;
            let transactions = match self.config.admission {
                // Writers were held off, so the pool is exactly the snapshot.
                PoolAdmission::Strict => pool.drain_and_attach(),
                PoolAdmission::Relaxed => {
                    pool.remove_mined(&snapshot);
                    snapshot
                }
            };
            let block = Block::create(nonce, previous_hash, transactions);
            chain.push(block.clone());
            (block, chain.len() - 1)
        };
        drop(cycle);

        info!(
            height,
            nonce,
            hash = %hex::encode(block.hash()),
            txs = block.transactions().len(),
            "action=mining, status=success"
        );

        let peers = self.peers().snapshot().await;
        let mut notified = broadcast(&self.client, &peers, &PeerNotice::ClearTransactions).await;
        notified.merge(broadcast(&self.client, &peers, &PeerNotice::ResolveConflicts).await);

        Ok(MinedBlock {
            block,
            height,
            notified,
        })
    }
}
