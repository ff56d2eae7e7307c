use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Separator between the namespace and the identifier of a composite key.
pub const COMPOSITE_SEPARATOR: char = '~';

/// Namespace under which pending ride applications are keyed.
pub const APPLICATION_NAMESPACE: &str = "application";

/// A key in the shared key-value namespace.
///
/// Users, ads, cars and rides live under *simple* keys equal to their own
/// identifier. Records keyed by another entity's identity (pending ride
/// applications are keyed by the applicant) live under *composite* keys
/// `namespace~id`, so they can never collide with the entity they are
/// keyed by. Simple identifiers therefore may not contain the separator.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Validate a simple entity identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        validate_segment(&id)?;
        Ok(Self(id))
    }

    /// Build a composite key `namespace~id`.
    pub fn composite(namespace: &str, id: &str) -> Result<Self, TypeError> {
        validate_segment(namespace)?;
        validate_segment(id)?;
        Ok(Self(format!("{namespace}{COMPOSITE_SEPARATOR}{id}")))
    }

    /// Key of the pending ride application of `user_id`.
    pub fn application(user_id: &str) -> Result<Self, TypeError> {
        Self::composite(APPLICATION_NAMESPACE, user_id)
    }

    /// Accept any well-formed key, simple or composite.
    ///
    /// Used for generic read-through queries where the caller names a raw key.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        match raw.split_once(COMPOSITE_SEPARATOR) {
            Some((namespace, id)) => Self::composite(namespace, id),
            None => Self::new(raw),
        }
    }

    /// Returns `true` for `namespace~id` keys.
    pub fn is_composite(&self) -> bool {
        self.0.contains(COMPOSITE_SEPARATOR)
    }

    /// The namespace of a composite key.
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once(COMPOSITE_SEPARATOR).map(|(ns, _)| ns)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_segment(segment: &str) -> Result<(), TypeError> {
    if segment.trim().is_empty() {
        return Err(TypeError::invalid_key(segment, "must not be empty"));
    }
    if segment.contains(COMPOSITE_SEPARATOR) {
        return Err(TypeError::invalid_key(
            segment,
            format!("must not contain '{COMPOSITE_SEPARATOR}'"),
        ));
    }
    if segment.chars().any(char::is_control) {
        return Err(TypeError::invalid_key(segment, "must not contain control characters"));
    }
    Ok(())
}

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKey({})", self.0)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_key_accepts_plate() {
        let key = EntityKey::new("BE-000-001").unwrap();
        assert_eq!(key.as_str(), "BE-000-001");
        assert!(!key.is_composite());
        assert_eq!(key.namespace(), None);
    }

    #[test]
    fn empty_and_blank_keys_rejected() {
        assert!(matches!(EntityKey::new(""), Err(TypeError::InvalidKey { .. })));
        assert!(matches!(EntityKey::new("  \t"), Err(TypeError::InvalidKey { .. })));
    }

    #[test]
    fn separator_rejected_in_simple_key() {
        let err = EntityKey::new("application~alice").unwrap_err();
        assert!(err.to_string().contains("must not contain '~'"));
    }

    #[test]
    fn control_characters_rejected() {
        assert!(EntityKey::new("a\u{0}b").is_err());
    }

    #[test]
    fn application_key_is_composite() {
        let key = EntityKey::application("alice").unwrap();
        assert_eq!(key.as_str(), "application~alice");
        assert!(key.is_composite());
        assert_eq!(key.namespace(), Some(APPLICATION_NAMESPACE));
        assert_ne!(key, EntityKey::new("alice").unwrap());
    }

    #[test]
    fn parse_accepts_both_shapes() {
        assert_eq!(EntityKey::parse("R1").unwrap(), EntityKey::new("R1").unwrap());
        assert_eq!(
            EntityKey::parse("application~bob").unwrap(),
            EntityKey::application("bob").unwrap()
        );
        assert!(EntityKey::parse("a~b~c").is_err());
        assert!(EntityKey::parse("~bob").is_err());
    }

    #[test]
    fn serde_is_transparent() {
        let key = EntityKey::new("R1").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"R1\"");
    }
}
