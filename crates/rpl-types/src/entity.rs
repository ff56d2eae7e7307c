use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::key::EntityKey;
use crate::record::Record;

/// Discriminator naming the kind of a stored record.
///
/// Serialized as the `docType` field of every record so a generic reader can
/// tell a car from a ride without guessing from the field shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocType {
    User,
    Ad,
    Car,
    CarpoolRide,
    ApplicationForRide,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ad => "ad",
            Self::Car => "car",
            Self::CarpoolRide => "carpoolRide",
            Self::ApplicationForRide => "applicationForRide",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub password: String,
    pub company_id: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

/// A comment attached to an ad. Embedded in the ad, never stored on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub user_id: String,
    pub comment_text: String,
}

/// A classified ad posted by a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub ad_id: String,
    pub user_id: String,
    pub created_on: String,
    pub title: String,
    pub category: String,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A vehicle, keyed by its licence plate.
///
/// `available_seats` bounds the roster of any ride using this car.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub licence_plate: String,
    pub available_seats: u32,
    pub make: String,
    pub color: String,
    pub owner: String,
}

/// A carpool trip and its approved-passenger roster.
///
/// `car` and `driver` are references by key to a [`Car`] and a [`User`].
/// The roster is ordered by acceptance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarpoolRide {
    pub carpool_ride_id: String,
    pub car: String,
    pub driver: String,
    pub destination: String,
    pub departure_hour: String,
    #[serde(default)]
    pub approved_passengers: Vec<String>,
}

impl CarpoolRide {
    /// A freshly offered ride with an empty roster.
    pub fn new(
        carpool_ride_id: impl Into<String>,
        car: impl Into<String>,
        driver: impl Into<String>,
        destination: impl Into<String>,
        departure_hour: impl Into<String>,
    ) -> Self {
        Self {
            carpool_ride_id: carpool_ride_id.into(),
            car: car.into(),
            driver: driver.into(),
            destination: destination.into(),
            departure_hour: departure_hour.into(),
            approved_passengers: Vec::new(),
        }
    }

    /// Number of seats already taken by approved passengers.
    pub fn seats_taken(&self) -> usize {
        self.approved_passengers.len()
    }

    /// Whether one more passenger fits in a car with `capacity` seats.
    pub fn has_seat_left(&self, capacity: u32) -> bool {
        // u32 -> usize never truncates on supported targets.
        self.seats_taken() < capacity as usize
    }
}

/// A rider's pending request to join a ride.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForRide {
    pub user_id: String,
    pub carpool_ride_id: String,
}

impl ApplicationForRide {
    pub fn new(user_id: impl Into<String>, carpool_ride_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            carpool_ride_id: carpool_ride_id.into(),
        }
    }
}

/// An entity that can be stored as a [`Record`].
pub trait Entity: Clone + Sized {
    /// Discriminator written into the record.
    const DOC_TYPE: DocType;

    /// Key under which this entity is stored.
    fn key(&self) -> Result<EntityKey, TypeError>;

    /// Wrap into the tagged record.
    fn into_record(self) -> Record;

    /// Unwrap from a record, handing the record back if it is another kind.
    fn try_from_record(record: Record) -> Result<Self, Record>;
}

macro_rules! impl_entity {
    ($ty:ident, $variant:ident, |$this:ident| $key:expr) => {
        impl Entity for $ty {
            const DOC_TYPE: DocType = DocType::$variant;

            fn key(&self) -> Result<EntityKey, TypeError> {
                let $this = self;
                $key
            }

            fn into_record(self) -> Record {
                Record::$variant(self)
            }

            fn try_from_record(record: Record) -> Result<Self, Record> {
                match record {
                    Record::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }
    };
}

impl_entity!(User, User, |u| EntityKey::new(u.user_id.as_str()));
impl_entity!(Ad, Ad, |a| EntityKey::new(a.ad_id.as_str()));
impl_entity!(Car, Car, |c| EntityKey::new(c.licence_plate.as_str()));
impl_entity!(CarpoolRide, CarpoolRide, |r| EntityKey::new(
    r.carpool_ride_id.as_str()
));
impl_entity!(ApplicationForRide, ApplicationForRide, |a| {
    EntityKey::application(&a.user_id)
});
