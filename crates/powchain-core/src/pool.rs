use crate::Transaction;

/// Unconfirmed transactions in arrival order. No deduplication and no
/// balance check.
#[derive(Clone, Debug, Default)]
pub struct TransactionPool {
    pending: Vec<Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tx: Transaction) {
        self.pending.push(tx);
    }

    /// Deep copy handed to the proof-of-work search.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.pending.clone()
    }

    /// Take everything for a new block and leave the pool empty.
    pub fn drain_and_attach(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.pending)
    }

    /// Drop the mined `snapshot` from the front of the pool, keeping anything
    /// appended after it was taken. If the pool no longer starts with the
    /// snapshot (it was cleared mid-cycle) nothing is removed.
    pub fn remove_mined(&mut self, snapshot: &[Transaction]) -> usize {
        if self.pending.starts_with(snapshot) {
            self.pending.drain(..snapshot.len());
            snapshot.len()
        } else {
            0
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(n: u32) -> Transaction {
        Transaction::new(format!("User{n}"), format!("User{}", n + 1), n as f64)
    }

    #[test]
    fn add_keeps_duplicates_in_order() {
        let mut pool = TransactionPool::new();
        pool.add(tx(1));
        pool.add(tx(1));
        pool.add(tx(2));
        assert_eq!(pool.transactions(), &[tx(1), tx(1), tx(2)]);
    }

    #[test]
    fn snapshot_is_detached_from_the_live_pool() {
        let mut pool = TransactionPool::new();
        pool.add(tx(1));
        let snapshot = pool.snapshot();
        pool.add(tx(2));
        assert_eq!(snapshot, vec![tx(1)]);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn drain_and_attach_empties_the_pool() {
        let mut pool = TransactionPool::new();
        pool.add(tx(1));
        pool.add(tx(2));
        let drained = pool.drain_and_attach();
        assert_eq!(drained, vec![tx(1), tx(2)]);
        assert!(pool.is_empty());
        assert!(pool.drain_and_attach().is_empty());
    }

    #[test]
    fn remove_mined_keeps_late_arrivals() {
        let mut pool = TransactionPool::new();
        pool.add(tx(1));
        pool.add(tx(2));
        let snapshot = pool.snapshot();
        pool.add(tx(3));
        assert_eq!(pool.remove_mined(&snapshot), 2);
        assert_eq!(pool.transactions(), &[tx(3)]);
    }

    #[test]
    fn remove_mined_after_clear_removes_nothing() {
        let mut pool = TransactionPool::new();
        pool.add(tx(1));
        let snapshot = pool.snapshot();
        pool.clear();
        pool.add(tx(5));
        assert_eq!(pool.remove_mined(&snapshot), 0);
        assert_eq!(pool.transactions(), &[tx(5)]);
    }
}
