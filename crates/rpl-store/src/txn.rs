use std::collections::BTreeSet;

use rpl_types::{EntityKey, TxId};
use tracing::debug;

use crate::changeset::{ChangeSet, CommitReceipt, Write};
use crate::error::StoreResult;
use crate::traits::KvLedger;

/// One atomic unit of work against a [`KvLedger`].
///
/// Reads go to the ledger (and are recorded in the read set) unless the key
/// was already written in this transaction, in which case the buffered value
/// is returned. Nothing reaches the ledger until [`Transaction::commit`];
/// dropping the transaction discards every buffered write.
pub struct Transaction<'a> {
    ledger: &'a dyn KvLedger,
    changes: ChangeSet,
}

impl<'a> Transaction<'a> {
    /// Open a transaction with a fresh [`TxId`].
    pub fn new(ledger: &'a dyn KvLedger) -> Self {
        Self {
            ledger,
            changes: ChangeSet::new(TxId::new()),
        }
    }

    pub fn tx_id(&self) -> TxId {
        self.changes.tx_id
    }

    /// Read a key as seen by this transaction.
    pub fn get(&mut self, key: &EntityKey) -> StoreResult<Option<Vec<u8>>> {
        if let Some(write) = self.changes.writes.get(key) {
            return Ok(match write {
                Write::Put(value) => Some(value.clone()),
                Write::Delete => None,
            });
        }

        let found = self.ledger.get(key)?;
        // The first observation of a key is the one validated at commit.
        self.changes
            .reads
            .entry(key.clone())
            .or_insert_with(|| found.as_ref().map(|v| v.version));
        Ok(found.map(|v| v.value))
    }

    /// Check whether a key exists as seen by this transaction.
    pub fn contains(&mut self, key: &EntityKey) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Buffer a write.
    pub fn put(&mut self, key: EntityKey, value: Vec<u8>) {
        self.changes.writes.insert(key, Write::Put(value));
    }

    /// Buffer a delete.
    pub fn delete(&mut self, key: EntityKey) {
        self.changes.writes.insert(key, Write::Delete);
    }

    /// Returns `true` if nothing has been written.
    pub fn is_read_only(&self) -> bool {
        self.changes.is_read_only()
    }

    /// Keys starting with `prefix` as seen by this transaction, in order.
    ///
    /// The listing itself is not validated at commit; read the keys that
    /// matter to put them in the read set.
    pub fn keys(&self, prefix: &str) -> StoreResult<Vec<EntityKey>> {
        let mut keys: BTreeSet<EntityKey> = self.ledger.keys(prefix)?.into_iter().collect();
        for (key, write) in &self.changes.writes {
            if !key.as_str().starts_with(prefix) {
                continue;
            }
            match write {
                Write::Put(_) => keys.insert(key.clone()),
                Write::Delete => keys.remove(key),
            };
        }
        Ok(keys.into_iter().collect())
    }

    /// Validate and apply every buffered write atomically.
    pub fn commit(self) -> StoreResult<CommitReceipt> {
        debug!(
            tx = %self.changes.tx_id,
            reads = self.changes.reads.len(),
            writes = self.changes.writes.len(),
            "committing transaction"
        );
        self.ledger.commit(self.changes)
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("tx_id", &self.changes.tx_id)
            .field("reads", &self.changes.reads.len())
            .field("writes", &self.changes.writes.len())
            .finish()
    }
}
