use serde::{Deserialize, Serialize};

/// Configuration for the ride workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RideConfig {
    /// When `true`, `create_ride` requires the car to be registered and the
    /// driver to be a registered user.
    pub check_references: bool,
}

impl Default for RideConfig {
    fn default() -> Self {
        Self {
            check_references: true,
        }
    }
}

impl RideConfig {
    /// Store car and driver as opaque references without looking them up.
    pub fn unchecked() -> Self {
        Self {
            check_references: false,
        }
    }
}
