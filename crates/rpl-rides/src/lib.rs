//! Ride capacity allocation for the RidePool Ledger.
//!
//! A driver offers a [`CarpoolRide`](rpl_types::CarpoolRide) in a registered
//! car. Riders apply, and each pending application is either accepted into
//! the ride's roster or denied:
//!
//! ```text
//!   [no application] --apply--> [pending] --accept--> [approved]
//!                                   |
//!                                   +------deny-----> [removed]
//! ```
//!
//! The roster never grows past the car's seat count. Every operation runs
//! inside a caller-supplied [`Transaction`](rpl_store::Transaction), so a
//! failed precondition leaves nothing behind and two racing accepts for the
//! last seat cannot both commit.

pub mod config;
pub mod error;
pub mod workflow;

pub use config::RideConfig;
pub use error::{RideError, RideResult};
pub use workflow::RideWorkflow;
