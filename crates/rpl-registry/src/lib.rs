//! Registry records for the RidePool Ledger.
//!
//! Plain create/append/remove operations over users, ads (with embedded
//! comments) and vehicles, plus the typed record access every higher layer
//! uses to read and write entities through a [`rpl_store::Transaction`].
//!
//! # Modules
//!
//! - [`access`]: kind-checked load/store helpers over the shared namespace
//! - [`users`]: user registration
//! - [`ads`]: ads and their comments
//! - [`vehicles`]: the vehicle registry (seat capacity per licence plate)

pub mod access;
pub mod ads;
pub mod error;
pub mod users;
pub mod vehicles;

pub use access::{claim, load, remove, require, store};
pub use ads::{add_comment, register_ad, remove_ad};
pub use error::{RegistryError, RegistryResult};
pub use users::create_user;
pub use vehicles::{add_car_for_user, get_car, parse_seats, remove_car};
