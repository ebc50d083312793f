// ── HTTP surface ──
//
// REST snapshot endpoints, live ingestion, the alert-status mutation and
// the WebSocket upgrade route. Handlers only translate between JSON and
// `Monitor` calls.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::error;

use netpulse_core::model::now_millis;
use netpulse_core::{Alert, AlertStatus, CoreError, LogEntry, LogLevel, Monitor, Severity};

use crate::ws;

const ROUTES: [&str; 4] = ["/api/alerts", "/api/logs", "/api/network", "/api/health"];

#[derive(Clone)]
pub struct AppState {
    pub monitor: Monitor,
    /// Port the listener actually bound, for the banner's WebSocket URL.
    pub port: u16,
    /// Cancelled on shutdown so open WebSocket sessions close.
    pub shutdown: CancellationToken,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(banner))
        .route("/api/alerts", get(list_alerts).post(create_alert))
        .route("/api/alerts/{id}/status", post(update_alert_status))
        .route("/api/logs", get(list_logs).post(create_log))
        .route("/api/network", get(network))
        .route("/api/health", get(health))
        .route("/ws", get(ws::upgrade))
        .with_state(state)
}

// ── Errors ───────────────────────────────────────────────────────────

/// Failures rendered as `{"error": ...}` with a matching status code.
pub enum ApiError {
    Core(CoreError),
    /// Missing, malformed or mistyped JSON body.
    Body(JsonRejection),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Body(rejection) => (rejection.status(), rejection.body_text()),
            Self::Core(err) if !err.is_client_error() => {
                error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_owned())
            }
            Self::Core(CoreError::AlertNotFound { .. }) => {
                (StatusCode::NOT_FOUND, "Alert not found".to_owned())
            }
            Self::Core(err @ CoreError::DuplicateAlert { .. }) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            Self::Core(err) => (StatusCode::BAD_REQUEST, err.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// ── Request bodies ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: String,
}

/// Alert submitted by a detector. Missing id, status and timestamp are
/// filled in server-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewAlert {
    id: Option<String>,
    severity: Severity,
    #[serde(rename = "type")]
    kind: String,
    source: String,
    destination: String,
    status: Option<AlertStatus>,
    timestamp: Option<i64>,
}

impl From<NewAlert> for Alert {
    fn from(body: NewAlert) -> Self {
        Self {
            id: body.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            severity: body.severity,
            kind: body.kind,
            source: body.source,
            destination: body.destination,
            status: body.status.unwrap_or(AlertStatus::Active),
            timestamp: body.timestamp.unwrap_or_else(now_millis),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewLog {
    level: LogLevel,
    component: String,
    message: String,
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn banner(State(app): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(host_without_port)
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost");

    Json(json!({
        "status": "ok",
        "message": "Realtime backend running",
        "routes": ROUTES,
        "websocket": format!("ws://{host}:{}/ws", app.port),
    }))
}

/// Strip a trailing `:port` from a Host header value. Bracketed IPv6
/// literals keep their brackets; a bare IPv6 address is returned whole.
fn host_without_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port))
            if port.bytes().all(|b| b.is_ascii_digit())
                && (name.ends_with(']') || !name.contains(':')) =>
        {
            name
        }
        _ => host,
    }
}

async fn list_alerts(State(app): State<AppState>) -> impl IntoResponse {
    Json(app.monitor.alerts())
}

async fn list_logs(State(app): State<AppState>) -> impl IntoResponse {
    Json(app.monitor.logs())
}

async fn network(State(app): State<AppState>) -> impl IntoResponse {
    Json(app.monitor.network())
}

async fn health(State(app): State<AppState>) -> impl IntoResponse {
    Json(app.monitor.health())
}

async fn update_alert_status(
    State(app): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let alert = app.monitor.set_alert_status(&id, &body.status)?;
    Ok(Json(alert))
}

async fn create_alert(
    State(app): State<AppState>,
    body: Result<Json<NewAlert>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let alert = app.monitor.append_alert(body.into())?;
    Ok((StatusCode::CREATED, Json(alert)))
}

async fn create_log(
    State(app): State<AppState>,
    body: Result<Json<NewLog>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let entry = app
        .monitor
        .append_log(LogEntry::new(body.level, body.component, body.message));
    Ok((StatusCode::CREATED, Json(entry)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::ServiceExt;

    use netpulse_core::{MonitorConfig, ScriptedSource};

    use super::*;

    fn app() -> (Router, Monitor) {
        let monitor = Monitor::new(MonitorConfig::default(), Arc::new(ScriptedSource::new()));
        let router = router(AppState {
            monitor: monitor.clone(),
            port: 5001,
            shutdown: CancellationToken::new(),
        });
        (router, monitor)
    }

    fn seed_alert(monitor: &Monitor, id: &str, severity: Severity) {
        monitor
            .append_alert(Alert {
                id: id.into(),
                severity,
                kind: "Malware".into(),
                source: "192.0.2.9".into(),
                destination: "10.0.0.3".into(),
                status: AlertStatus::Active,
                timestamp: 1_700_000_000_000,
            })
            .unwrap();
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn banner_points_at_websocket() {
        let (router, _) = app();
        let request = Request::get("/api")
            .header(header::HOST, "sensor.lan:8080")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["websocket"], "ws://sensor.lan:5001/ws");
        assert_eq!(body["routes"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn host_port_is_stripped() {
        assert_eq!(host_without_port("sensor.lan:8080"), "sensor.lan");
        assert_eq!(host_without_port("sensor.lan"), "sensor.lan");
        assert_eq!(host_without_port("[::1]:5001"), "[::1]");
        assert_eq!(host_without_port("[fe80::1]"), "[fe80::1]");
        assert_eq!(host_without_port("::1"), "::1");
    }

    #[tokio::test]
    async fn banner_keeps_ipv6_host() {
        let (router, _) = app();
        let request = Request::get("/api")
            .header(header::HOST, "[::1]:5001")
            .body(Body::empty())
            .unwrap();

        let (_, body) = send(router, request).await;
        assert_eq!(body["websocket"], "ws://[::1]:5001/ws");
    }

    #[tokio::test]
    async fn bad_bodies_get_json_errors() {
        let (router, monitor) = app();
        seed_alert(&monitor, "A1", Severity::Low);

        let missing_status = post_json("/api/alerts/A1/status", &json!({}));
        let (status, body) = send(router.clone(), missing_status).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());

        let malformed = Request::post("/api/logs")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"level\": "))
            .unwrap();
        let (status, body) = send(router.clone(), malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let untyped = Request::post("/api/alerts").body(Body::from("{}")).unwrap();
        let (status, body) = send(router, untyped).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["error"].is_string());

        assert_eq!(monitor.alerts()[0].status, AlertStatus::Active);
        assert!(monitor.logs().is_empty());
    }

    #[tokio::test]
    async fn alerts_list_newest_first() {
        let (router, monitor) = app();
        seed_alert(&monitor, "A1", Severity::Low);
        seed_alert(&monitor, "A2", Severity::High);

        let (status, body) = send(router, get("/api/alerts")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "A2");
        assert_eq!(body[0]["type"], "Malware");
        assert_eq!(body[1]["id"], "A1");
    }

    #[tokio::test]
    async fn status_update_on_unknown_alert_is_404() {
        let (router, _) = app();
        let (status, body) = send(
            router,
            post_json("/api/alerts/ghost/status", &json!({ "status": "Resolved" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Alert not found" }));
    }

    #[tokio::test]
    async fn status_update_returns_updated_alert() {
        let (router, monitor) = app();
        seed_alert(&monitor, "A1", Severity::Critical);

        let (status, body) = send(
            router,
            post_json("/api/alerts/A1/status", &json!({ "status": "Investigating" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "A1");
        assert_eq!(body["status"], "Investigating");
        assert_eq!(body["severity"], "Critical");
        assert_eq!(monitor.alerts()[0].status, AlertStatus::Investigating);
    }

    #[tokio::test]
    async fn invalid_status_is_400() {
        let (router, monitor) = app();
        seed_alert(&monitor, "A1", Severity::Low);

        let (status, body) = send(
            router,
            post_json("/api/alerts/A1/status", &json!({ "status": "Closed" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Closed"));
    }

    #[tokio::test]
    async fn ingestion_creates_and_rejects_duplicates() {
        let (router, monitor) = app();
        let alert = json!({
            "id": "IDS-1",
            "severity": "High",
            "type": "Port Scan",
            "source": "198.51.100.1",
            "destination": "10.0.0.1"
        });

        let (status, body) = send(router.clone(), post_json("/api/alerts", &alert)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "Active");

        let (status, _) = send(router.clone(), post_json("/api/alerts", &alert)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let log = json!({ "level": "ERROR", "component": "ids", "message": "signature db stale" });
        let (status, body) = send(router, post_json("/api/logs", &log)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["level"], "ERROR");
        assert_eq!(monitor.logs().len(), 1);
    }

    #[tokio::test]
    async fn health_and_network_snapshots() {
        let (router, monitor) = app();
        seed_alert(&monitor, "A1", Severity::Critical);

        let (status, body) = send(router.clone(), get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["services"]["IDS Engine"]["status"], "Degraded");
        assert_eq!(body["services"]["Traffic Monitor"]["uptime"], "100%");

        let (status, body) = send(router, get("/api/network")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["interfaces"], json!([]));
        assert!(body["total"]["rxBytesPerSec"].is_number());
    }
}
