use rpl_types::{EntityKey, ErrorKind};

/// Errors from ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A key read by the transaction changed before it could commit.
    #[error("commit conflict on {key}: read version {read:?}, current version {current:?}")]
    Conflict {
        key: EntityKey,
        read: Option<u64>,
        current: Option<u64>,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding ledger state was poisoned by a panicking writer.
    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Every ledger failure surfaces to callers as the ledger being unavailable.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::LedgerUnavailable
    }
}

/// Result alias for ledger operations.
pub type StoreResult<T> = Result<T, StoreError>;
