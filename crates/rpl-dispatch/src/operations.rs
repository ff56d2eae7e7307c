//! The operation table: every callable name, its parameters, and its handler.
//!
//! Handlers receive exactly as many arguments as their operation declares;
//! the dispatcher rejects any other count before a handler runs.

use rpl_registry as registry;
use rpl_rides::RideWorkflow;
use rpl_store::Transaction;
use rpl_types::{Ad, Car, Entity, User};

use crate::error::DispatchResult;

/// Signature shared by every operation handler.
pub type Handler = fn(&RideWorkflow, &mut Transaction<'_>, &[String]) -> DispatchResult<Vec<u8>>;

/// A named operation with a fixed parameter list.
#[derive(Clone, Copy)]
pub struct Operation {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub summary: &'static str,
    pub(crate) handler: Handler,
}

impl Operation {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// `name <param> <param> ...`
    pub fn usage(&self) -> String {
        let mut usage = self.name.to_string();
        for param in self.params {
            usage.push_str(" <");
            usage.push_str(param);
            usage.push('>');
        }
        usage
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// Operations registered on every dispatcher.
pub(crate) const OPERATIONS: &[Operation] = &[
    Operation {
        name: "query",
        params: &["key"],
        summary: "Read the raw record stored under a key",
        handler: query,
    },
    Operation {
        name: "createUser",
        params: &["userId", "password", "companyId", "email", "firstname", "lastname"],
        summary: "Register or update a user",
        handler: create_user,
    },
    Operation {
        name: "registerAd",
        params: &["adId", "userId", "createdOn", "title", "category", "from", "to", "text"],
        summary: "Publish an ad for a registered user",
        handler: register_ad,
    },
    Operation {
        name: "addComment",
        params: &["adId", "userId", "text"],
        summary: "Append a comment to an ad",
        handler: add_comment,
    },
    Operation {
        name: "addCarForUser",
        params: &["licencePlate", "availableSeats", "make", "color", "owner"],
        summary: "Register or update a car for its owner",
        handler: add_car_for_user,
    },
    Operation {
        name: "removeAd",
        params: &["adId"],
        summary: "Delete an ad",
        handler: remove_ad,
    },
    Operation {
        name: "removeCar",
        params: &["licencePlate"],
        summary: "Delete a car",
        handler: remove_car,
    },
    Operation {
        name: "createRide",
        params: &["rideId", "carPlate", "driverId", "destination", "departureTime"],
        summary: "Offer a ride with an empty roster",
        handler: create_ride,
    },
    Operation {
        name: "addCarpoolRide",
        params: &["rideId", "carPlate", "driverId", "destination", "departureTime", "passengers"],
        summary: "Older createRide; the passenger list is ignored",
        handler: add_carpool_ride,
    },
    Operation {
        name: "apply",
        params: &["rideId", "applicantUserId"],
        summary: "Apply to join a ride",
        handler: apply,
    },
    Operation {
        name: "accept",
        params: &["rideId", "applicantUserId"],
        summary: "Accept a pending applicant if a seat is left",
        handler: accept,
    },
    Operation {
        name: "deny",
        params: &["applicantUserId"],
        summary: "Drop a pending application",
        handler: deny,
    },
];

/// Older names still accepted, mapped to their current operation.
pub(crate) const ALIASES: &[(&str, &str)] = &[
    ("setCandidateForRide", "apply"),
    ("acceptCandidateForRide", "accept"),
    ("denyCandidateForRide", "deny"),
];

fn encode<T: Entity>(entity: T) -> DispatchResult<Vec<u8>> {
    Ok(entity.into_record().to_bytes()?)
}

fn query(rides: &RideWorkflow, tx: &mut Transaction<'_>, args: &[String]) -> DispatchResult<Vec<u8>> {
    Ok(rides.query(tx, &args[0])?)
}

fn create_user(_: &RideWorkflow, tx: &mut Transaction<'_>, args: &[String]) -> DispatchResult<Vec<u8>> {
    let user = User {
        user_id: args[0].clone(),
        password: args[1].clone(),
        company_id: args[2].clone(),
        email: args[3].clone(),
        firstname: args[4].clone(),
        lastname: args[5].clone(),
    };
    encode(registry::create_user(tx, user)?)
}

fn register_ad(_: &RideWorkflow, tx: &mut Transaction<'_>, args: &[String]) -> DispatchResult<Vec<u8>> {
    let ad = Ad {
        ad_id: args[0].clone(),
        user_id: args[1].clone(),
        created_on: args[2].clone(),
        title: args[3].clone(),
        category: args[4].clone(),
        from: args[5].clone(),
        to: args[6].clone(),
        text: args[7].clone(),
        comments: Vec::new(),
    };
    encode(registry::register_ad(tx, ad)?)
}

fn add_comment(_: &RideWorkflow, tx: &mut Transaction<'_>, args: &[String]) -> DispatchResult<Vec<u8>> {
    encode(registry::add_comment(tx, &args[0], &args[1], &args[2])?)
}

fn add_car_for_user(
    _: &RideWorkflow,
    tx: &mut Transaction<'_>,
    args: &[String],
) -> DispatchResult<Vec<u8>> {
    let car = Car {
        licence_plate: args[0].clone(),
        available_seats: registry::parse_seats(&args[1])?,
        make: args[2].clone(),
        color: args[3].clone(),
        owner: args[4].clone(),
    };
    encode(registry::add_car_for_user(tx, car)?)
}

fn remove_ad(_: &RideWorkflow, tx: &mut Transaction<'_>, args: &[String]) -> DispatchResult<Vec<u8>> {
    registry::remove_ad(tx, &args[0])?;
    Ok(Vec::new())
}

fn remove_car(_: &RideWorkflow, tx: &mut Transaction<'_>, args: &[String]) -> DispatchResult<Vec<u8>> {
    registry::remove_car(tx, &args[0])?;
    Ok(Vec::new())
}

fn create_ride(rides: &RideWorkflow, tx: &mut Transaction<'_>, args: &[String]) -> DispatchResult<Vec<u8>> {
    encode(rides.create_ride(tx, &args[0], &args[1], &args[2], &args[3], &args[4])?)
}

/// Rosters only grow through `accept`, so `args[5]` is not read.
fn add_carpool_ride(
    rides: &RideWorkflow,
    tx: &mut Transaction<'_>,
    args: &[String],
) -> DispatchResult<Vec<u8>> {
    create_ride(rides, tx, &args[..5])
}

fn apply(rides: &RideWorkflow, tx: &mut Transaction<'_>, args: &[String]) -> DispatchResult<Vec<u8>> {
    encode(rides.apply(tx, &args[0], &args[1])?)
}

fn accept(rides: &RideWorkflow, tx: &mut Transaction<'_>, args: &[String]) -> DispatchResult<Vec<u8>> {
    encode(rides.accept(tx, &args[0], &args[1])?)
}

fn deny(rides: &RideWorkflow, tx: &mut Transaction<'_>, args: &[String]) -> DispatchResult<Vec<u8>> {
    rides.deny(tx, &args[0])?;
    Ok(Vec::new())
}
