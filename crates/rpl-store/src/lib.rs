//! Transactional key-value ledger for the RidePool Ledger.
//!
//! Every entity lives as an opaque byte record under a unique key in one
//! shared namespace. Callers never write to the ledger directly: they open a
//! [`Transaction`], read and buffer writes through it, and commit it as one
//! atomic unit.
//!
//! # Commit Contract
//!
//! 1. A transaction records the version of every key it reads (its read set).
//! 2. On commit the ledger re-checks the read set under its write lock. If any
//!    key changed since it was read, the commit fails with
//!    [`StoreError::Conflict`] and nothing is applied.
//! 3. Otherwise all buffered writes are applied atomically and stamped with
//!    the new commit height.
//! 4. Last writer wins among non-conflicting commits; the ledger never
//!    interprets record contents.
//!
//! # Backends
//!
//! - [`InMemoryLedger`]: `BTreeMap` behind a `RwLock`, for tests and embedding
//! - [`JournalLedger`]: same state, made durable by an append-only,
//!   CRC-framed journal replayed on open

pub mod changeset;
pub mod error;
pub mod journal;
pub mod memory;
pub mod traits;
pub mod txn;

pub use changeset::{ChangeSet, CommitReceipt, Write};
pub use error::{StoreError, StoreResult};
pub use journal::{JournalConfig, JournalLedger, SyncMode};
pub use memory::InMemoryLedger;
pub use traits::{KvLedger, Versioned};
pub use txn::Transaction;
