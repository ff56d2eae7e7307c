use std::collections::BTreeMap;

use rpl_types::{EntityKey, TxId};
use serde::{Deserialize, Serialize};

/// A buffered write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Write {
    Put(Vec<u8>),
    Delete,
}

/// Everything one transaction observed and wants to change.
///
/// `reads` maps each key read to the version observed (`None` when the key
/// was absent). `writes` holds the last buffered write per key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub tx_id: TxId,
    pub reads: BTreeMap<EntityKey, Option<u64>>,
    pub writes: BTreeMap<EntityKey, Write>,
}

impl ChangeSet {
    pub fn new(tx_id: TxId) -> Self {
        Self {
            tx_id,
            reads: BTreeMap::new(),
            writes: BTreeMap::new(),
        }
    }

    /// Returns `true` if the transaction buffered no writes.
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Outcome of a successful commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: TxId,
    /// Ledger height after the commit. Unchanged for read-only commits.
    pub height: u64,
    pub puts: usize,
    pub deletes: usize,
}
