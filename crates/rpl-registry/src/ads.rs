use rpl_store::Transaction;
use rpl_types::{Ad, Comment, Entity, EntityKey, User};
use tracing::info;

use crate::access::{claim, remove, require, store};
use crate::error::RegistryResult;

/// Publish an ad for a registered user.
///
/// The ad starts without comments. Re-registering an ad id overwrites the
/// previous ad, comments included.
pub fn register_ad(tx: &mut Transaction<'_>, mut ad: Ad) -> RegistryResult<Ad> {
    require::<User>(tx, &EntityKey::new(ad.user_id.as_str())?)?;
    let key = ad.key()?;
    claim::<Ad>(tx, &key)?;

    ad.comments.clear();
    store(tx, &ad)?;
    info!(ad = %key, user = %ad.user_id, "ad registered");
    Ok(ad)
}

/// Append a comment by a registered user to an existing ad.
pub fn add_comment(
    tx: &mut Transaction<'_>,
    ad_id: &str,
    user_id: &str,
    text: &str,
) -> RegistryResult<Ad> {
    require::<User>(tx, &EntityKey::new(user_id)?)?;
    let mut ad = require::<Ad>(tx, &EntityKey::new(ad_id)?)?;

    ad.comments.push(Comment {
        user_id: user_id.to_string(),
        comment_text: text.to_string(),
    });
    store(tx, &ad)?;
    info!(ad = ad_id, user = user_id, comments = ad.comments.len(), "comment added");
    Ok(ad)
}

/// Delete an ad.
pub fn remove_ad(tx: &mut Transaction<'_>, ad_id: &str) -> RegistryResult<Ad> {
    let ad = remove::<Ad>(tx, &EntityKey::new(ad_id)?)?;
    info!(ad = ad_id, "ad removed");
    Ok(ad)
}
