//! Longest-valid-chain conflict resolution.

use crate::peers::PeerClient;
use crate::{pow, Block, Blockchain};
use tracing::{debug, info, warn};

/// Check parent links and proofs of work. Chains of zero or one block are
/// trivially valid; the genesis block is exempt from the difficulty check.
pub fn valid_chain(chain: &[Block], difficulty: usize) -> bool {
    if chain.len() <= 1 {
        return true;
    }
    for (index, pair) in chain.windows(2).enumerate() {
        let (parent, block) = (&pair[0], &pair[1]);
        let index = index + 1;
        let parent_hash = parent.hash();
        if block.previous_hash() != &parent_hash {
            debug!(
                index,
                expected = %hex::encode(parent_hash),
                got = %hex::encode(block.previous_hash()),
                "previous hash mismatch"
            );
            return false;
        }
        if !pow::valid_proof(
            block.nonce(),
            block.previous_hash(),
            block.transactions(),
            difficulty,
        ) {
            debug!(index, nonce = block.nonce(), "proof of work invalid");
            return false;
        }
    }
    true
}

impl<C: PeerClient> Blockchain<C> {
    /// Adopt the longest valid peer chain that is strictly longer than ours.
    /// Returns whether the local chain was replaced. The pool is untouched.
    pub async fn resolve_conflicts(&self) -> bool {
        let local_len = self.len().await;
        let difficulty = self.config.difficulty;
        let mut max_len = local_len;
        let mut longest: Option<(String, Vec<Block>)> = None;

        for peer in self.peers().snapshot().await {
            let chain = match self.client.fetch_chain(&peer).await {
                Ok(chain) => chain,
                Err(err) => {
                    warn!(%peer, error = %err, "skipping peer");
                    continue;
                }
            };
            let len = chain.len();
            if len > max_len && valid_chain(&chain, difficulty) {
                debug!(%peer, len, "longer valid chain found");
                max_len = len;
                longest = Some((peer, chain));
            } else {
                debug!(%peer, len, "peer chain not longer or invalid");
            }
        }

        let Some((peer, candidate)) = longest else {
            info!(length = local_len, "resolve conflicts: chain kept");
            return false;
        };

        // Swap under the mining lock; a cycle may have grown the chain while
        // peers were being fetched.
        let _cycle = self.cycle.lock().await;
        let mut chain = self.chain.write().await;
        if candidate.len() <= chain.len() {
            info!(
                length = chain.len(),
                candidate = candidate.len(),
                "resolve conflicts: local chain caught up"
            );
            return false;
        }
        info!(%peer, length = candidate.len(), "resolve conflicts: chain replaced");
        *chain = candidate;
        true
    }
}
