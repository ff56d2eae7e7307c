use std::collections::BTreeMap;
use std::sync::RwLock;

use rpl_types::EntityKey;
use tracing::debug;

use crate::changeset::{ChangeSet, CommitReceipt, Write};
use crate::error::{StoreError, StoreResult};
use crate::traits::{KvLedger, Versioned};

/// Committed key-value state shared by every backend.
#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    entries: BTreeMap<EntityKey, Versioned>,
    height: u64,
}

impl LedgerState {
    pub(crate) fn get(&self, key: &EntityKey) -> Option<Versioned> {
        self.entries.get(key).cloned()
    }

    pub(crate) fn height(&self) -> u64 {
        self.height
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn keys(&self, prefix: &str) -> Vec<EntityKey> {
        self.entries
            .keys()
            .filter(|k| k.as_str().starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Check that every key in the read set is still at the observed version.
    pub(crate) fn validate(&self, changes: &ChangeSet) -> StoreResult<()> {
        for (key, read) in &changes.reads {
            let current = self.entries.get(key).map(|v| v.version);
            if current != *read {
                return Err(StoreError::Conflict {
                    key: key.clone(),
                    read: *read,
                    current,
                });
            }
        }
        Ok(())
    }

    /// Apply an already validated change set.
    pub(crate) fn apply(&mut self, changes: &ChangeSet) -> CommitReceipt {
        if changes.is_read_only() {
            return CommitReceipt {
                tx_id: changes.tx_id,
                height: self.height,
                puts: 0,
                deletes: 0,
            };
        }

        self.height += 1;
        let (mut puts, mut deletes) = (0, 0);
        for (key, write) in &changes.writes {
            match write {
                Write::Put(value) => {
                    self.entries.insert(
                        key.clone(),
                        Versioned {
                            value: value.clone(),
                            version: self.height,
                        },
                    );
                    puts += 1;
                }
                Write::Delete => {
                    self.entries.remove(key);
                    deletes += 1;
                }
            }
        }
        CommitReceipt {
            tx_id: changes.tx_id,
            height: self.height,
            puts,
            deletes,
        }
    }
}

/// In-memory, `BTreeMap`-based ledger.
///
/// Intended for tests and embedding. State is lost when the ledger is dropped.
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.len())
    }

    /// Returns `true` if no key is stored.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl KvLedger for InMemoryLedger {
    fn get(&self, key: &EntityKey) -> StoreResult<Option<Versioned>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.get(key))
    }

    fn commit(&self, changes: ChangeSet) -> StoreResult<CommitReceipt> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        state.validate(&changes)?;
        let receipt = state.apply(&changes);
        debug!(
            tx = %receipt.tx_id,
            height = receipt.height,
            puts = receipt.puts,
            deletes = receipt.deletes,
            "commit applied"
        );
        Ok(receipt)
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<EntityKey>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.keys(prefix))
    }

    fn height(&self) -> StoreResult<u64> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.height())
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("key_count", &self.len().ok())
            .finish()
    }
}
