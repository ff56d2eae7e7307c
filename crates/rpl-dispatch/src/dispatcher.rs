use std::collections::BTreeMap;
use std::sync::Arc;

use rpl_rides::{RideConfig, RideWorkflow};
use rpl_store::{KvLedger, Transaction};
use tracing::{debug, info, warn};

use crate::error::{DispatchError, DispatchResult};
use crate::operations::{Operation, ALIASES, OPERATIONS};
use crate::response::Response;

/// Routes named invocations to their handlers over a shared ledger.
///
/// Each call runs in its own [`Transaction`]: the handler's writes are
/// committed together when it succeeds and discarded when it fails.
pub struct Dispatcher {
    ledger: Arc<dyn KvLedger>,
    rides: RideWorkflow,
    operations: BTreeMap<&'static str, Operation>,
    aliases: BTreeMap<&'static str, &'static str>,
}

impl Dispatcher {
    pub fn new(ledger: Arc<dyn KvLedger>, config: RideConfig) -> Self {
        let operations = OPERATIONS.iter().map(|op| (op.name, *op)).collect();
        let aliases = ALIASES.iter().copied().collect();
        Self {
            ledger,
            rides: RideWorkflow::new(config),
            operations,
            aliases,
        }
    }

    pub fn ledger(&self) -> &dyn KvLedger {
        self.ledger.as_ref()
    }

    /// Registered operations in name order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    /// `(alias, operation)` pairs for the older operation names.
    pub fn aliases(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.aliases.iter().map(|(alias, name)| (*alias, *name))
    }

    /// Find the operation for `function`, following aliases.
    pub fn resolve(&self, function: &str) -> DispatchResult<&Operation> {
        let name = self.aliases.get(function).copied().unwrap_or(function);
        self.operations
            .get(name)
            .ok_or_else(|| DispatchError::UnknownFunction(function.to_string()))
    }

    /// Run `function` with `args` and commit its writes.
    pub fn try_invoke(&self, function: &str, args: &[String]) -> DispatchResult<Vec<u8>> {
        let op = self.resolve(function)?;
        if args.len() != op.arity() {
            return Err(DispatchError::Arity {
                function: function.to_string(),
                expected: op.arity(),
                got: args.len(),
            });
        }

        let mut tx = Transaction::new(self.ledger.as_ref());
        let payload = (op.handler)(&self.rides, &mut tx, args)?;
        let receipt = tx.commit()?;
        debug!(
            function = op.name,
            tx = %receipt.tx_id.short_id(),
            height = receipt.height,
            puts = receipt.puts,
            deletes = receipt.deletes,
            "invocation committed"
        );
        Ok(payload)
    }

    /// Run `function` and fold the outcome into a [`Response`].
    pub fn invoke(&self, function: &str, args: &[String]) -> Response {
        let result = self.try_invoke(function, args);
        match &result {
            Ok(payload) => info!(function, bytes = payload.len(), "invocation succeeded"),
            Err(err) => warn!(function, kind = %err.kind(), error = %err, "invocation failed"),
        }
        result.into()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("operations", &self.operations.len())
            .field("aliases", &self.aliases.len())
            .field("config", self.rides.config())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpl_store::InMemoryLedger;
    use rpl_types::ErrorKind;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(InMemoryLedger::new()), RideConfig::default())
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn ok(d: &Dispatcher, function: &str, values: &[&str]) -> serde_json::Value {
        let response = d.invoke(function, &args(values));
        let payload = response
            .payload()
            .unwrap_or_else(|| panic!("{function} failed: {response:?}"));
        if payload.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(payload).unwrap()
        }
    }

    fn seed(d: &Dispatcher, seats: &str) {
        ok(d, "createUser", &["driverA", "pw", "ACME", "a@x.be", "Ann", "Driver"]);
        ok(d, "addCarForUser", &["BE-1", seats, "Audi", "Black", "driverA"]);
        ok(d, "createRide", &["R1", "BE-1", "driverA", "Ghent", "11:30"]);
    }

    #[test]
    fn unknown_function_is_validation() {
        let d = dispatcher();
        let response = d.invoke("teleport", &[]);
        assert_eq!(response.kind(), Some(ErrorKind::Validation));
        assert_eq!(d.ledger().height().unwrap(), 0);
    }

    #[test]
    fn wrong_arity_is_validation_and_writes_nothing() {
        let d = dispatcher();
        let err = d.try_invoke("createRide", &args(&["R1", "BE-1"])).unwrap_err();
        assert!(matches!(err, DispatchError::Arity { expected: 5, got: 2, .. }));
        assert_eq!(err.to_string(), "createRide expects 5 argument(s), got 2");
        assert_eq!(d.ledger().height().unwrap(), 0);
    }

    #[test]
    fn operation_table_is_complete() {
        let d = dispatcher();
        let names: Vec<_> = d.operations().map(|op| op.name).collect();
        for expected in [
            "query",
            "createUser",
            "registerAd",
            "addComment",
            "addCarForUser",
            "removeAd",
            "removeCar",
            "createRide",
            "apply",
            "accept",
            "deny",
            "addCarpoolRide",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
        assert_eq!(d.aliases().count(), 3);
    }

    #[test]
    fn ride_scenario_end_to_end() {
        let d = dispatcher();
        seed(&d, "1");

        let app = ok(&d, "apply", &["R1", "alice"]);
        assert_eq!(app["docType"], "applicationForRide");
        let ride = ok(&d, "accept", &["R1", "alice"]);
        assert_eq!(ride["approvedPassengers"], serde_json::json!(["alice"]));
        assert_eq!(ride["destination"], "Ghent");

        ok(&d, "apply", &["R1", "bob"]);
        let response = d.invoke("accept", &args(&["R1", "bob"]));
        assert_eq!(response.kind(), Some(ErrorKind::CapacityExceeded));

        let stored = ok(&d, "query", &["R1"]);
        assert_eq!(stored["approvedPassengers"], serde_json::json!(["alice"]));
    }

    #[test]
    fn legacy_names_reach_the_same_handlers() {
        let d = dispatcher();
        ok(&d, "createUser", &["driverA", "pw", "ACME", "a@x.be", "Ann", "Driver"]);
        ok(&d, "addCarForUser", &["BE-1", "2", "Audi", "Black", "driverA"]);
        ok(&d, "addCarpoolRide", &["R1", "BE-1", "driverA", "Ghent", "11:30", "[]"]);
        ok(&d, "setCandidateForRide", &["R1", "alice"]);
        ok(&d, "acceptCandidateForRide", &["R1", "alice"]);
        ok(&d, "setCandidateForRide", &["R1", "bob"]);
        assert_eq!(ok(&d, "denyCandidateForRide", &["bob"]), serde_json::Value::Null);
    }

    #[test]
    fn add_carpool_ride_ignores_the_passenger_list() {
        let d = dispatcher();
        ok(&d, "createUser", &["driverA", "pw", "ACME", "a@x.be", "Ann", "Driver"]);
        ok(&d, "addCarForUser", &["BE-1", "1", "Audi", "Black", "driverA"]);

        let ride = ok(&d, "addCarpoolRide", &["R1", "BE-1", "driverA", "Ghent", "11:30", "alice,bob"]);
        assert_eq!(ride["approvedPassengers"], serde_json::json!([]));
        assert_eq!(ok(&d, "query", &["R1"])["departureHour"], "11:30");

        let err = d
            .try_invoke("addCarpoolRide", &args(&["R2", "BE-1", "driverA", "Ghent", "11:30"]))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Arity { expected: 6, got: 5, .. }));
    }

    #[test]
    fn failed_handler_commits_nothing() {
        let d = dispatcher();
        seed(&d, "1");
        ok(&d, "apply", &["R1", "alice"]);
        ok(&d, "accept", &["R1", "alice"]);
        ok(&d, "apply", &["R1", "bob"]);
        let height = d.ledger().height().unwrap();

        assert!(!d.invoke("accept", &args(&["R1", "bob"])).is_success());
        assert!(!d.invoke("deny", &args(&["carol"])).is_success());
        assert_eq!(d.ledger().height().unwrap(), height);
    }

    #[test]
    fn duplicate_ride_reports_already_exists() {
        let d = dispatcher();
        seed(&d, "3");
        let response = d.invoke("createRide", &args(&["R1", "BE-1", "driverA", "Antwerp", "08:00"]));
        assert_eq!(response.kind(), Some(ErrorKind::AlreadyExists));
        assert_eq!(ok(&d, "query", &["R1"])["destination"], "Ghent");
    }

    #[test]
    fn deny_then_query_is_not_found() {
        let d = dispatcher();
        seed(&d, "3");
        ok(&d, "apply", &["R1", "alice"]);
        assert_eq!(ok(&d, "deny", &["alice"]), serde_json::Value::Null);

        let response = d.invoke("query", &args(&["application~alice"]));
        assert_eq!(response.kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn non_numeric_seats_are_validation() {
        let d = dispatcher();
        ok(&d, "createUser", &["marc", "pw", "ACME", "m@x.be", "Marc", "O"]);
        let response = d.invoke("addCarForUser", &args(&["BE-1", "many", "Audi", "Black", "marc"]));
        assert_eq!(response.kind(), Some(ErrorKind::Validation));
    }

    #[test]
    fn ads_and_comments() {
        let d = dispatcher();
        ok(&d, "createUser", &["marc", "pw", "ACME", "m@x.be", "Marc", "O"]);
        let response = d.invoke(
            "registerAd",
            &args(&["AD1", "ghost", "2024-03-01", "t", "c", "Brussels", "Ghent", "x"]),
        );
        assert_eq!(response.kind(), Some(ErrorKind::NotFound));

        ok(&d, "registerAd", &["AD1", "marc", "2024-03-01", "t", "c", "Brussels", "Ghent", "x"]);
        let ad = ok(&d, "addComment", &["AD1", "marc", "still free"]);
        assert_eq!(ad["comments"][0]["commentText"], "still free");

        ok(&d, "removeAd", &["AD1"]);
        assert_eq!(d.invoke("query", &args(&["AD1"])).kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn debug_summarises_table() {
        let rendered = format!("{:?}", dispatcher());
        assert!(rendered.contains("operations: 12"));
    }
}
