use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller-facing classification shared by every error in the workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Wrong argument count or shape.
    Validation,
    /// A referenced entity is absent.
    NotFound,
    /// A create collided with an existing key.
    AlreadyExists,
    /// The ride has no seat left.
    CapacityExceeded,
    /// The underlying ledger could not be read or written.
    LedgerUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::LedgerUnavailable => "ledger_unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

impl TypeError {
    pub(crate) fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKey { .. } => ErrorKind::Validation,
            // Stored bytes that do not decode mean the ledger handed back garbage.
            Self::Serialization(_) | Self::MalformedRecord(_) => ErrorKind::LedgerUnavailable,
        }
    }
}
