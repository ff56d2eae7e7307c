//! HTTP server for the RidePool Ledger.
//!
//! Exposes the operation dispatcher as `POST /v1/invoke` alongside health
//! and info endpoints, and owns the node configuration that decides which
//! ledger backend to open.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{LedgerConfig, NodeConfig, ServerConfig, DEFAULT_PORT};
pub use error::{ServerError, ServerResult};
pub use handler::{status_for, HealthResponse, InvokeRequest, InvokeResponse};
pub use server::RidePoolServer;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use rpl_dispatch::Dispatcher;
    use rpl_rides::RideConfig;
    use rpl_store::InMemoryLedger;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn app() -> axum::Router {
        let dispatcher = Dispatcher::new(Arc::new(InMemoryLedger::new()), RideConfig::default());
        router::build_router(Arc::new(dispatcher))
    }

    async fn invoke(app: &axum::Router, function: &str, args: &[&str]) -> (StatusCode, Value) {
        let body = json!({ "function": function, "args": args }).to_string();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/invoke")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = app()
            .oneshot(Request::builder().uri("/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn info_endpoint() {
        let response = app()
            .oneshot(Request::builder().uri("/v1/info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let info: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(info["ledger_height"], 0);
        assert!(info["operations"].as_array().unwrap().contains(&json!("accept")));
    }

    #[tokio::test]
    async fn invoke_round_trip() {
        let app = app();
        let (status, body) =
            invoke(&app, "createUser", &["driverA", "pw", "ACME", "a@x.be", "Ann", "D"]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");

        invoke(&app, "addCarForUser", &["BE-1", "1", "Audi", "Black", "driverA"]).await;
        invoke(&app, "createRide", &["R1", "BE-1", "driverA", "Ghent", "11:30"]).await;
        invoke(&app, "apply", &["R1", "alice"]).await;

        let (status, body) = invoke(&app, "accept", &["R1", "alice"]).await;
        assert_eq!(status, StatusCode::OK);
        let ride: Value = serde_json::from_str(body["payload"].as_str().unwrap()).unwrap();
        assert_eq!(ride["approvedPassengers"], json!(["alice"]));

        invoke(&app, "apply", &["R1", "bob"]).await;
        let (status, body) = invoke(&app, "accept", &["R1", "bob"]).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["kind"], "capacity_exceeded");
    }

    #[tokio::test]
    async fn error_kinds_map_to_statuses() {
        let app = app();
        let (status, body) = invoke(&app, "teleport", &[]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");

        let (status, _) = invoke(&app, "deny", &["nobody"]).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = invoke(&app, "query", &["R404"]).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/invoke")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
