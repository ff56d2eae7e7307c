//! Foundation types for the RidePool Ledger (RPL).
//!
//! Every RPL crate depends on `rpl-types`. It defines how entities are named
//! in the shared key-value namespace and how they are encoded into the
//! self-describing records the ledger stores.
//!
//! # Key Types
//!
//! - [`EntityKey`]: validated key in the shared namespace (simple or composite)
//! - [`DocType`]: discriminator naming the kind of a stored record
//! - [`Record`]: tagged union of every persisted entity, with its codec
//! - [`Car`], [`CarpoolRide`], [`ApplicationForRide`]: the ride workflow entities
//! - [`User`], [`Ad`], [`Comment`]: registry entities
//! - [`TxId`]: UUID v7 transaction identifier
//! - [`ErrorKind`]: caller-facing error taxonomy

pub mod entity;
pub mod error;
pub mod key;
pub mod record;
pub mod tx;

pub use entity::{Ad, ApplicationForRide, Car, CarpoolRide, Comment, DocType, Entity, User};
pub use error::{ErrorKind, TypeError};
pub use key::{EntityKey, APPLICATION_NAMESPACE, COMPOSITE_SEPARATOR};
pub use record::Record;
pub use tx::TxId;
