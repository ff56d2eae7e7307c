//! The vehicle registry: seat capacity per licence plate.
//!
//! A car referenced by a ride keeps enough seats for that ride's roster and
//! cannot be removed until no ride names it.

use rpl_store::Transaction;
use rpl_types::{Car, CarpoolRide, DocType, Entity, EntityKey, Record, User};
use tracing::info;

use crate::access::{claim, remove, require, store};
use crate::error::{RegistryError, RegistryResult};

/// Parse a seat count argument.
pub fn parse_seats(raw: &str) -> RegistryResult<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        RegistryError::InvalidArgument(format!(
            "available seats must be a non-negative integer, got {raw:?}"
        ))
    })
}

/// Register a car for a registered owner, or re-register it with new details.
pub fn add_car_for_user(tx: &mut Transaction<'_>, car: Car) -> RegistryResult<Car> {
    require::<User>(tx, &EntityKey::new(car.owner.as_str())?)?;
    let key = car.key()?;
    let previous = claim::<Car>(tx, &key)?;
    if previous
        .as_ref()
        .is_some_and(|prev| car.available_seats < prev.available_seats)
    {
        for ride in rides_using(tx, &key)? {
            if ride.approved_passengers.len() > car.available_seats as usize {
                return Err(RegistryError::SeatsBelowRoster {
                    plate: key,
                    ride: ride.key()?,
                    seats: car.available_seats,
                    taken: ride.approved_passengers.len(),
                });
            }
        }
    }
    store(tx, &car)?;
    info!(
        plate = %key,
        owner = %car.owner,
        seats = car.available_seats,
        replaced = previous.is_some(),
        "car registered"
    );
    Ok(car)
}

/// Look up a car by licence plate.
pub fn get_car(tx: &mut Transaction<'_>, plate: &str) -> RegistryResult<Car> {
    require::<Car>(tx, &EntityKey::new(plate)?)
}

/// Delete a car.
pub fn remove_car(tx: &mut Transaction<'_>, plate: &str) -> RegistryResult<Car> {
    let key = EntityKey::new(plate)?;
    if let Some(ride) = rides_using(tx, &key)?.first() {
        return Err(RegistryError::CarInUse {
            plate: key,
            ride: ride.key()?,
        });
    }
    let car = remove::<Car>(tx, &key)?;
    info!(plate, "car removed");
    Ok(car)
}

/// Every ride whose `car` is `plate`. Each ride read joins the read set.
fn rides_using(tx: &mut Transaction<'_>, plate: &EntityKey) -> RegistryResult<Vec<CarpoolRide>> {
    let mut rides = Vec::new();
    for key in tx.keys("")? {
        if key.is_composite() {
            continue;
        }
        let Some(bytes) = tx.get(&key)? else {
            continue;
        };
        if Record::peek_doc_type(&bytes)? != DocType::CarpoolRide {
            continue;
        }
        if let Record::CarpoolRide(ride) = Record::from_bytes(&bytes)? {
            if ride.car == plate.as_str() {
                rides.push(ride);
            }
        }
    }
    Ok(rides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::create_user;
    use rpl_store::InMemoryLedger;
    use crate::access::store;
    use rpl_types::ErrorKind;

    fn owner(tx: &mut Transaction<'_>, id: &str) {
        create_user(
            tx,
            User {
                user_id: id.into(),
                password: "pw".into(),
                company_id: "ACME".into(),
                email: format!("{id}@example.com"),
                firstname: "F".into(),
                lastname: "L".into(),
            },
        )
        .unwrap();
    }

    fn car(plate: &str, seats: u32, owner: &str) -> Car {
        Car {
            licence_plate: plate.into(),
            available_seats: seats,
            make: "Audi".into(),
            color: "Black".into(),
            owner: owner.into(),
        }
    }

    #[test]
    fn parse_seats_accepts_padded_integers() {
        assert_eq!(parse_seats("3").unwrap(), 3);
        assert_eq!(parse_seats(" 0 ").unwrap(), 0);
    }

    #[test]
    fn parse_seats_rejects_garbage() {
        for raw in ["three", "-1", "", "2.5"] {
            let err = parse_seats(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{raw:?}");
        }
    }

    #[test]
    fn register_and_get() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        owner(&mut tx, "marc");
        add_car_for_user(&mut tx, car("BE-000-001", 3, "marc")).unwrap();
        tx.commit().unwrap();

        let mut tx = Transaction::new(&ledger);
        let got = get_car(&mut tx, "BE-000-001").unwrap();
        assert_eq!(got.available_seats, 3);
        assert_eq!(got.owner, "marc");
    }

    #[test]
    fn re_registration_updates_seats() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        owner(&mut tx, "marc");
        add_car_for_user(&mut tx, car("BE-1", 3, "marc")).unwrap();
        add_car_for_user(&mut tx, car("BE-1", 5, "marc")).unwrap();
        assert_eq!(get_car(&mut tx, "BE-1").unwrap().available_seats, 5);
    }

    #[test]
    fn owner_must_be_registered() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        let err = add_car_for_user(&mut tx, car("BE-1", 3, "ghost")).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { kind: DocType::User, .. }));
    }

    #[test]
    fn missing_car_is_not_found() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        let err = get_car(&mut tx, "BE-404").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { kind: DocType::Car, .. }));
        assert_eq!(remove_car(&mut tx, "BE-404").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn remove_then_get_fails() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        owner(&mut tx, "marc");
        add_car_for_user(&mut tx, car("BE-1", 3, "marc")).unwrap();
        remove_car(&mut tx, "BE-1").unwrap();
        assert!(get_car(&mut tx, "BE-1").is_err());
    }

    fn ride_on(tx: &mut Transaction<'_>, id: &str, plate: &str, passengers: &[&str]) {
        let ride = CarpoolRide {
            carpool_ride_id: id.into(),
            car: plate.into(),
            driver: "marc".into(),
            destination: "Ghent".into(),
            departure_hour: "11:30".into(),
            approved_passengers: passengers.iter().map(|p| p.to_string()).collect(),
        };
        store(tx, &ride).unwrap();
    }

    #[test]
    fn seats_cannot_drop_below_a_roster() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        owner(&mut tx, "marc");
        add_car_for_user(&mut tx, car("BE-1", 2, "marc")).unwrap();
        ride_on(&mut tx, "R1", "BE-1", &["u1", "u2"]);
        ride_on(&mut tx, "R2", "BE-2", &["u3", "u4", "u5"]);
        tx.commit().unwrap();

        let mut tx = Transaction::new(&ledger);
        let err = add_car_for_user(&mut tx, car("BE-1", 1, "marc")).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::SeatsBelowRoster { seats: 1, taken: 2, .. }
        ));
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
        assert_eq!(get_car(&mut tx, "BE-1").unwrap().available_seats, 2);

        // Down to the roster size, or up, is fine.
        add_car_for_user(&mut tx, car("BE-1", 2, "marc")).unwrap();
        add_car_for_user(&mut tx, car("BE-1", 4, "marc")).unwrap();
        add_car_for_user(&mut tx, car("BE-1", 2, "marc")).unwrap();
    }

    #[test]
    fn referenced_car_cannot_be_removed() {
        let ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(&ledger);
        owner(&mut tx, "marc");
        add_car_for_user(&mut tx, car("BE-1", 2, "marc")).unwrap();
        ride_on(&mut tx, "R1", "BE-1", &[]);

        let err = remove_car(&mut tx, "BE-1").unwrap_err();
        assert!(matches!(err, RegistryError::CarInUse { .. }));
        assert_eq!(err.to_string(), "car BE-1 is used by ride R1");
        assert!(get_car(&mut tx, "BE-1").is_ok());

        tx.delete(EntityKey::new("R1").unwrap());
        remove_car(&mut tx, "BE-1").unwrap();
    }
}
