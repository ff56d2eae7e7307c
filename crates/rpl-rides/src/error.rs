use rpl_registry::RegistryError;
use rpl_store::StoreError;
use rpl_types::{ErrorKind, TypeError};
use thiserror::Error;

/// Errors from the ride workflow.
#[derive(Debug, Error)]
pub enum RideError {
    #[error("carpool ride not found: {0}")]
    RideNotFound(String),

    #[error("car not found: {0}")]
    CarNotFound(String),

    /// No application is pending for the user, or it is pending for another ride.
    #[error("no pending application from {user}{}", for_ride(.ride))]
    ApplicationNotFound { user: String, ride: Option<String> },

    /// The roster already fills every seat of the car.
    #[error("ride {ride} is full: {taken} of {seats} seats taken")]
    CapacityExceeded { ride: String, seats: u32, taken: usize },

    #[error("key already in use: {0}")]
    AlreadyExists(String),

    /// The applicant is waiting on a different ride.
    #[error("{user} already has a pending application for ride {ride}")]
    PendingElsewhere { user: String, ride: String },

    /// The applicant is already on the roster.
    #[error("{user} is already a passenger of ride {ride}")]
    AlreadyPassenger { user: String, ride: String },

    #[error("no record under key {0}")]
    RecordNotFound(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("ledger error: {0}")]
    Store(#[from] StoreError),
}

impl RideError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RideNotFound(_)
            | Self::CarNotFound(_)
            | Self::ApplicationNotFound { .. }
            | Self::RecordNotFound(_) => ErrorKind::NotFound,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::AlreadyExists(_) | Self::PendingElsewhere { .. } | Self::AlreadyPassenger { .. } => {
                ErrorKind::AlreadyExists
            }
            Self::Registry(e) => e.kind(),
            Self::Type(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}

fn for_ride(ride: &Option<String>) -> String {
    ride.as_ref()
        .map(|r| format!(" for ride {r}"))
        .unwrap_or_default()
}

/// Result alias for ride workflow operations.
pub type RideResult<T> = Result<T, RideError>;
