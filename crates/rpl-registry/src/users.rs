use rpl_store::Transaction;
use rpl_types::{Entity, User};
use tracing::info;

use crate::access::{claim, store};
use crate::error::RegistryResult;

/// Register a user under their user id.
///
/// Re-registering an existing user overwrites the record. The id must not
/// be taken by a record of another kind.
pub fn create_user(tx: &mut Transaction<'_>, user: User) -> RegistryResult<User> {
    let key = user.key()?;
    let previous = claim::<User>(tx, &key)?;
    store(tx, &user)?;
    info!(user = %key, replaced = previous.is_some(), "user registered");
    Ok(user)
}
