use rpl_registry::RegistryError;
use rpl_rides::RideError;
use rpl_store::StoreError;
use rpl_types::{ErrorKind, TypeError};

/// Errors surfaced by the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function} expects {expected} argument(s), got {got}")]
    Arity {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Ride(#[from] RideError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("ledger error: {0}")]
    Store(#[from] StoreError),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownFunction(_) | Self::Arity { .. } => ErrorKind::Validation,
            Self::Ride(e) => e.kind(),
            Self::Registry(e) => e.kind(),
            Self::Type(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}

/// Result alias for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
