//! HTTP API layer.
//!
//! Thin axum surface over the store: transport, routing, parameter
//! defaulting, and API-key checking live here; everything of substance is
//! delegated to the [`LogStore`] behind the shared state.
//!
//! # Endpoints
//!
//! | Method | Path      | Description |
//! |--------|-----------|-------------|
//! | `POST` | `/logs`   | Create a log record |
//! | `GET`  | `/logs`   | List records with optional filters and pagination |
//! | `GET`  | `/health` | Health check (API + store reachability) |
//!
//! `/logs` requires the `x-api-key` header to match the key configured via
//! the `LOGWELL_API_KEY` environment variable; `/health` is open.
//!
//! # Error Contract
//!
//! All error responses share one JSON shape:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "pageSize must be between 1 and 100" } }
//! ```
//!
//! Error codes: `unauthorized` (401), `bad_request` (400), `internal` (500).
//! Store failures map to `internal`; they are never broken down further for
//! clients.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::models::{LogInput, LogPage, LogQuery, LogRecord, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::store::LogStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn LogStore>,
    api_key: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn LogStore>, api_key: Option<String>) -> Self {
        Self { store, api_key }
    }
}

/// Build the router with all routes and the permissive CORS layer.
///
/// Exposed separately from [`run_server`] so tests can drive the API
/// against an in-memory store on an ephemeral port.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/logs", post(handle_create_log).get(handle_list_logs))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server and run until the process is terminated.
pub async fn run_server(
    bind: &str,
    store: Arc<dyn LogStore>,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    if api_key.is_none() {
        tracing::warn!("LOGWELL_API_KEY is not set; all /logs requests will be rejected");
    }

    let app = router(AppState::new(store, api_key));

    tracing::info!("listening on http://{bind}");
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Handlers ============

async fn handle_create_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LogInput>,
) -> Result<(StatusCode, Json<LogRecord>), AppError> {
    check_api_key(&state, &headers)?;

    let record = state.store.index_log(input).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Query-string parameters for `GET /logs`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListLogsParams {
    service_name: Option<String>,
    level: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

async fn handle_list_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListLogsParams>,
) -> Result<Json<LogPage>, AppError> {
    check_api_key(&state, &headers)?;

    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(bad_request("page must be >= 1"));
    }

    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(bad_request(format!(
            "pageSize must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let query = LogQuery {
        service_name: params.service_name,
        level: params.level,
        start_date: params
            .start_date
            .as_deref()
            .map(|s| parse_date("startDate", s))
            .transpose()?,
        end_date: params
            .end_date
            .as_deref()
            .map(|s| parse_date("endDate", s))
            .transpose()?,
        page,
        page_size,
    };

    let result = state.store.search(&query).await.map_err(internal)?;
    Ok(Json(result))
}

/// Health payload for `GET /health`.
#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    store: &'static str,
    timestamp: DateTime<Utc>,
}

/// Always answers 200; store unreachability shows up as `degraded`/`down`
/// rather than an error.
async fn handle_health(State(state): State<AppState>) -> Json<HealthStatus> {
    let up = state.store.ping().await;

    Json(HealthStatus {
        status: if up { "ok" } else { "degraded" },
        store: if up { "up" } else { "down" },
        timestamp: Utc::now(),
    })
}

// ============ Request helpers ============

fn check_api_key(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let provided = headers.get("x-api-key").and_then(|v| v.to_str().ok());

    let Some(provided) = provided else {
        return Err(unauthorized("API key is missing"));
    };

    match state.api_key.as_deref() {
        Some(expected) if provided == expected => Ok(()),
        _ => Err(unauthorized("Invalid API key")),
    }
}

/// Parse a date parameter as RFC 3339, falling back to a plain
/// `YYYY-MM-DD` date read as midnight UTC.
fn parse_date(name: &str, value: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap().and_utc());
    }
    Err(bad_request(format!(
        "{name} must be an RFC 3339 date-time or a YYYY-MM-DD date"
    )))
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Constructs a 401 Unauthorized error.
fn unauthorized(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::UNAUTHORIZED,
        code: "unauthorized".to_string(),
        message: message.into(),
    }
}

/// Constructs a 500 error from a store failure, logging the details.
fn internal(err: crate::error::StoreError) -> AppError {
    tracing::error!("store operation failed: {err}");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_rfc3339() {
        let dt = parse_date("startDate", "2025-01-15T10:30:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_parse_date_with_offset() {
        let dt = parse_date("startDate", "2025-01-15T10:30:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-15T08:30:00+00:00");
    }

    #[test]
    fn test_parse_date_plain_date_is_midnight_utc() {
        let dt = parse_date("endDate", "2025-01-15").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-15T00:00:00+00:00");
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("startDate", "yesterday").is_err());
        assert!(parse_date("startDate", "15/01/2025").is_err());
    }
}
