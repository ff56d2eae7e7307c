use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use rpl_dispatch::{Dispatcher, Response};
use rpl_types::ErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Body of `GET /v1/health`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Body of `POST /v1/invoke`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Reply to `POST /v1/invoke`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvokeResponse {
    Success { payload: String },
    Error { kind: ErrorKind, message: String },
}

impl From<Response> for InvokeResponse {
    fn from(response: Response) -> Self {
        match response {
            Response::Success { payload } => Self::Success {
                payload: String::from_utf8_lossy(&payload).into_owned(),
            },
            Response::Error { kind, message } => Self::Error { kind, message },
        }
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyExists | ErrorKind::CapacityExceeded => StatusCode::CONFLICT,
        ErrorKind::LedgerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler(State(dispatcher): State<Arc<Dispatcher>>) -> Json<serde_json::Value> {
    let height = dispatcher.ledger().height().ok();
    let operations: Vec<_> = dispatcher.operations().map(|op| op.name).collect();
    Json(json!({
        "name": "rpl-server",
        "version": env!("CARGO_PKG_VERSION"),
        "ledger_height": height,
        "operations": operations,
    }))
}

/// Invoke handler. The dispatcher blocks on ledger I/O, so it runs off the
/// async worker threads.
pub async fn invoke_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    Json(request): Json<InvokeRequest>,
) -> (StatusCode, Json<InvokeResponse>) {
    let function = request.function.clone();
    let joined = tokio::task::spawn_blocking(move || {
        dispatcher.invoke(&request.function, &request.args)
    })
    .await;

    let response = match joined {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(function = %function, error = %e, "invocation task failed");
            Response::error(ErrorKind::LedgerUnavailable, format!("invocation aborted: {e}"))
        }
    };
    reply(response)
}

/// Status and body for a dispatcher response; the status always follows the
/// body's error kind.
fn reply(response: Response) -> (StatusCode, Json<InvokeResponse>) {
    let status = response.kind().map_or(StatusCode::OK, status_for);
    (status, Json(response.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::AlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::CapacityExceeded), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::LedgerUnavailable), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn invoke_response_shape() {
        let body = InvokeResponse::from(Response::error(ErrorKind::NotFound, "car not found: BE-9"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "not_found");

        let body = InvokeResponse::from(Response::success(b"{}".to_vec()));
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"status": "success", "payload": "{}"}));
    }

    #[test]
    fn aborted_invocation_status_matches_its_kind() {
        let (status, Json(body)) = reply(Response::error(
            ErrorKind::LedgerUnavailable,
            "invocation aborted: task panicked",
        ));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        match body {
            InvokeResponse::Error { kind, .. } => assert_eq!(status_for(kind), status),
            other => panic!("expected an error body, got {other:?}"),
        }

        let (status, _) = reply(Response::success(Vec::new()));
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn args_default_to_empty() {
        let req: InvokeRequest = serde_json::from_str(r#"{"function":"ops"}"#).unwrap();
        assert!(req.args.is_empty());
    }
}
