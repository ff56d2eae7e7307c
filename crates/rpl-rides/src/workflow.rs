use rpl_registry::{get_car, load, require, store, RegistryError};
use rpl_store::Transaction;
use rpl_types::{ApplicationForRide, Car, CarpoolRide, DocType, EntityKey, User};
use tracing::{debug, info, warn};

use crate::config::RideConfig;
use crate::error::{RideError, RideResult};

// ---------------------------------------------------------------------------
// RideWorkflow
// ---------------------------------------------------------------------------

/// The ride application workflow.
///
/// Stateless apart from its configuration: every operation reads and writes
/// through the transaction it is handed, and commits nothing itself.
#[derive(Clone, Debug, Default)]
pub struct RideWorkflow {
    config: RideConfig,
}

impl RideWorkflow {
    pub fn new(config: RideConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RideConfig {
        &self.config
    }

    /// Offer a new ride with an empty roster.
    ///
    /// Fails with `AlreadyExists` if anything is stored under `ride_id`.
    /// With reference checks enabled the car and the driver must already be
    /// registered.
    pub fn create_ride(
        &self,
        tx: &mut Transaction<'_>,
        ride_id: &str,
        car_plate: &str,
        driver_id: &str,
        destination: &str,
        departure_hour: &str,
    ) -> RideResult<CarpoolRide> {
        let key = EntityKey::new(ride_id)?;
        if tx.contains(&key)? {
            return Err(RideError::AlreadyExists(ride_id.to_string()));
        }

        EntityKey::new(car_plate)?;
        let driver_key = EntityKey::new(driver_id)?;
        if self.config.check_references {
            car_for(tx, car_plate)?;
            require::<User>(tx, &driver_key)?;
        }

        let ride = CarpoolRide::new(ride_id, car_plate, driver_id, destination, departure_hour);
        store(tx, &ride)?;
        info!(ride = ride_id, car = car_plate, driver = driver_id, "ride created");
        Ok(ride)
    }

    /// Register `user_id`'s wish to join `ride_id`.
    ///
    /// Applying again to the same ride while the first application is
    /// pending returns that application and writes nothing. A user waits on
    /// at most one ride at a time.
    pub fn apply(
        &self,
        tx: &mut Transaction<'_>,
        ride_id: &str,
        user_id: &str,
    ) -> RideResult<ApplicationForRide> {
        let ride = load_ride(tx, ride_id)?;
        if ride.approved_passengers.iter().any(|p| p == user_id) {
            return Err(RideError::AlreadyPassenger {
                user: user_id.to_string(),
                ride: ride_id.to_string(),
            });
        }

        let app_key = EntityKey::application(user_id)?;
        match load::<ApplicationForRide>(tx, &app_key)? {
            Some(existing) if existing.carpool_ride_id == ride_id => {
                debug!(ride = ride_id, user = user_id, "application already pending");
                Ok(existing)
            }
            Some(existing) => Err(RideError::PendingElsewhere {
                user: user_id.to_string(),
                ride: existing.carpool_ride_id,
            }),
            None => {
                let application = ApplicationForRide::new(user_id, ride_id);
                store(tx, &application)?;
                info!(ride = ride_id, user = user_id, "application filed");
                Ok(application)
            }
        }
    }

    /// Move a pending applicant onto the ride's roster.
    ///
    /// The roster only grows while it is strictly shorter than the car's
    /// seat count. On success the whole ride is written back and the
    /// application is consumed.
    pub fn accept(
        &self,
        tx: &mut Transaction<'_>,
        ride_id: &str,
        user_id: &str,
    ) -> RideResult<CarpoolRide> {
        let mut ride = load_ride(tx, ride_id)?;
        let car = car_for(tx, &ride.car)?;

        let app_key = EntityKey::application(user_id)?;
        match load::<ApplicationForRide>(tx, &app_key)? {
            Some(app) if app.carpool_ride_id == ride_id => {}
            _ => {
                return Err(RideError::ApplicationNotFound {
                    user: user_id.to_string(),
                    ride: Some(ride_id.to_string()),
                })
            }
        }

        if !ride.has_seat_left(car.available_seats) {
            warn!(
                ride = ride_id,
                user = user_id,
                seats = car.available_seats,
                "ride is full"
            );
            return Err(RideError::CapacityExceeded {
                ride: ride_id.to_string(),
                seats: car.available_seats,
                taken: ride.seats_taken(),
            });
        }

        ride.approved_passengers.push(user_id.to_string());
        store(tx, &ride)?;
        tx.delete(app_key);
        info!(
            ride = ride_id,
            user = user_id,
            taken = ride.seats_taken(),
            seats = car.available_seats,
            "applicant accepted"
        );
        Ok(ride)
    }

    /// Withdraw `user_id`'s pending application, whichever ride it targets.
    pub fn deny(&self, tx: &mut Transaction<'_>, user_id: &str) -> RideResult<ApplicationForRide> {
        let app_key = EntityKey::application(user_id)?;
        let Some(application) = load::<ApplicationForRide>(tx, &app_key)? else {
            return Err(RideError::ApplicationNotFound {
                user: user_id.to_string(),
                ride: None,
            });
        };
        tx.delete(app_key);
        info!(ride = %application.carpool_ride_id, user = user_id, "application denied");
        Ok(application)
    }

    /// Raw stored bytes under `raw_key`.
    pub fn query(&self, tx: &mut Transaction<'_>, raw_key: &str) -> RideResult<Vec<u8>> {
        let key = EntityKey::parse(raw_key)?;
        tx.get(&key)?
            .ok_or_else(|| RideError::RecordNotFound(raw_key.to_string()))
    }
}

fn load_ride(tx: &mut Transaction<'_>, ride_id: &str) -> RideResult<CarpoolRide> {
    let key = EntityKey::new(ride_id)?;
    load::<CarpoolRide>(tx, &key)?.ok_or_else(|| RideError::RideNotFound(ride_id.to_string()))
}

/// The car behind `plate`, as the vehicle registry reports it.
fn car_for(tx: &mut Transaction<'_>, plate: &str) -> RideResult<Car> {
    get_car(tx, plate).map_err(|err| match err {
        RegistryError::NotFound {
            kind: DocType::Car, ..
        } => RideError::CarNotFound(plate.to_string()),
        other => other.into(),
    })
}
