use rpl_types::EntityKey;

use crate::changeset::{ChangeSet, CommitReceipt};
use crate::error::StoreResult;

/// A stored value together with the commit height that last wrote it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versioned {
    pub value: Vec<u8>,
    pub version: u64,
}

/// Versioned key-value ledger with atomic, validated commits.
///
/// All implementations must satisfy these invariants:
/// - `commit` is all-or-nothing: either every write in the change set is
///   visible to later reads or none is.
/// - `commit` rejects a change set whose read set is stale.
/// - Every successful commit that writes anything advances `height` by one
///   and stamps each written key with the new height.
/// - The ledger never interprets stored bytes.
pub trait KvLedger: Send + Sync {
    /// Read the current value and version of a key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &EntityKey) -> StoreResult<Option<Versioned>>;

    /// Validate and apply a change set atomically.
    fn commit(&self, changes: ChangeSet) -> StoreResult<CommitReceipt>;

    /// All keys starting with `prefix`, sorted. Pass `""` for every key.
    fn keys(&self, prefix: &str) -> StoreResult<Vec<EntityKey>>;

    /// Number of writing commits applied so far.
    fn height(&self) -> StoreResult<u64>;

    /// Check whether a key exists.
    fn contains(&self, key: &EntityKey) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
