//! Operation dispatcher for the RidePool Ledger.
//!
//! Callers name an operation and pass positional string arguments. The
//! [`Dispatcher`] looks the name up in its operation table, checks the
//! argument count, and runs the handler inside a single ledger
//! transaction that commits only if the handler succeeds.

pub mod dispatcher;
pub mod error;
pub mod operations;
pub mod response;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult};
pub use operations::{Handler, Operation};
pub use response::Response;
