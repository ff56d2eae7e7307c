//! Kind-checked access to entities in the shared namespace.
//!
//! Every key holds at most one record, and every record names its kind in
//! its `docType` field. These helpers never reinterpret one kind as another:
//! reading a car key as a ride is a [`RegistryError::KindMismatch`], and
//! claiming a user's key for an ad is a [`RegistryError::AlreadyExists`].

use rpl_store::Transaction;
use rpl_types::{Entity, EntityKey, Record};

use crate::error::{RegistryError, RegistryResult};

/// Load the entity stored under `key`, if any.
pub fn load<T: Entity>(tx: &mut Transaction<'_>, key: &EntityKey) -> RegistryResult<Option<T>> {
    let Some(bytes) = tx.get(key)? else {
        return Ok(None);
    };
    let record = Record::from_bytes(&bytes)?;
    T::try_from_record(record)
        .map(Some)
        .map_err(|other| RegistryError::KindMismatch {
            key: key.clone(),
            expected: T::DOC_TYPE,
            found: other.doc_type(),
        })
}

/// Load the entity stored under `key`, failing with `NotFound` if absent.
pub fn require<T: Entity>(tx: &mut Transaction<'_>, key: &EntityKey) -> RegistryResult<T> {
    load(tx, key)?.ok_or_else(|| RegistryError::not_found(T::DOC_TYPE, key))
}

/// Prepare to write a `T` under `key`.
///
/// Returns the existing `T` (a write will overwrite it) or `None` when the
/// key is free. A record of any other kind makes the key unavailable.
pub fn claim<T: Entity>(tx: &mut Transaction<'_>, key: &EntityKey) -> RegistryResult<Option<T>> {
    match load::<T>(tx, key) {
        Err(RegistryError::KindMismatch { key, found, .. }) => Err(RegistryError::AlreadyExists {
            key,
            existing: found,
        }),
        other => other,
    }
}

/// Buffer a write of `entity` under its own key.
pub fn store<T: Entity>(tx: &mut Transaction<'_>, entity: &T) -> RegistryResult<EntityKey> {
    let key = entity.key()?;
    let bytes = entity.clone().into_record().to_bytes()?;
    tx.put(key.clone(), bytes);
    Ok(key)
}

/// Delete the `T` stored under `key`, failing with `NotFound` if absent.
pub fn remove<T: Entity>(tx: &mut Transaction<'_>, key: &EntityKey) -> RegistryResult<T> {
    let existing = require::<T>(tx, key)?;
    tx.delete(key.clone());
    Ok(existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpl_store::{InMemoryLedger, KvLedger};
    use rpl_types::{ApplicationForRide, Car, CarpoolRide, DocType, ErrorKind};

    fn car() -> Car {
        Car {
            licence_plate: "BE-1".into(),
            available_seats: 2,
            make: "Audi".into(),
            color: "Black".into(),
            owner: "marc".into(),
        }
    }

    fn key(s: &str) -> EntityKey {
        EntityKey::new(s).unwrap()
    }

    #[test]
    fn store_then_load() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        let k = store(&mut tx, &car()).unwrap();
        assert_eq!(k, key("BE-1"));
        tx.commit().unwrap();

        let mut tx = Transaction::new(&ledger);
        assert_eq!(load::<Car>(&mut tx, &k).unwrap(), Some(car()));
    }

    #[test]
    fn require_missing_is_not_found() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        let err = require::<Car>(&mut tx, &key("BE-9")).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { kind: DocType::Car, .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "car not found: BE-9");
    }

    #[test]
    fn load_other_kind_is_mismatch() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        store(&mut tx, &car()).unwrap();

        let err = load::<CarpoolRide>(&mut tx, &key("BE-1")).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::KindMismatch {
                expected: DocType::CarpoolRide,
                found: DocType::Car,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn claim_rejects_other_kind() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        store(&mut tx, &car()).unwrap();

        let err = claim::<CarpoolRide>(&mut tx, &key("BE-1")).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::AlreadyExists {
                existing: DocType::Car,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        // Same kind is returned for overwrite.
        assert_eq!(claim::<Car>(&mut tx, &key("BE-1")).unwrap(), Some(car()));
        assert_eq!(claim::<Car>(&mut tx, &key("BE-2")).unwrap(), None);
    }

    #[test]
    fn remove_deletes_and_returns() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        let app = ApplicationForRide::new("alice", "R1");
        let k = store(&mut tx, &app).unwrap();
        tx.commit().unwrap();

        let mut tx = Transaction::new(&ledger);
        assert_eq!(remove::<ApplicationForRide>(&mut tx, &k).unwrap(), app);
        tx.commit().unwrap();
        assert!(ledger.get(&k).unwrap().is_none());
    }

    #[test]
    fn garbage_bytes_surface_as_ledger_failure() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        tx.put(key("R1"), br#"["alice"]"#.to_vec());
        let err = load::<CarpoolRide>(&mut tx, &key("R1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LedgerUnavailable);
    }
}
