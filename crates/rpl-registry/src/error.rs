use rpl_store::StoreError;
use rpl_types::{DocType, EntityKey, ErrorKind, TypeError};
use thiserror::Error;

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// An argument could not be interpreted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No record exists under the key.
    #[error("{kind} not found: {key}")]
    NotFound { kind: DocType, key: EntityKey },

    /// The key holds a record of another kind.
    #[error("{key} holds a {found}, not a {expected}")]
    KindMismatch {
        key: EntityKey,
        expected: DocType,
        found: DocType,
    },

    /// The key is already taken by a record of another kind.
    #[error("key {key} is already used by a {existing}")]
    AlreadyExists { key: EntityKey, existing: DocType },

    /// Re-registration would leave a ride with more passengers than seats.
    #[error("car {plate} cannot drop to {seats} seat(s): ride {ride} already carries {taken}")]
    SeatsBelowRoster {
        plate: EntityKey,
        ride: EntityKey,
        seats: u32,
        taken: usize,
    },

    /// A ride still refers to the car.
    #[error("car {plate} is used by ride {ride}")]
    CarInUse { plate: EntityKey, ride: EntityKey },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("ledger error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    pub fn not_found(kind: DocType, key: &EntityKey) -> Self {
        Self::NotFound {
            kind,
            key: key.clone(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::Validation,
            Self::NotFound { .. } | Self::KindMismatch { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::SeatsBelowRoster { .. } => ErrorKind::CapacityExceeded,
            Self::CarInUse { .. } => ErrorKind::Validation,
            Self::Type(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
