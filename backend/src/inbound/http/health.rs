//! Health endpoints: orchestration probes plus the public `/api/health` summary.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::DatabaseLiveness;

/// Track readiness, liveness and which storage backend is currently serving.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    database: Option<Arc<dyn DatabaseLiveness>>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            database: None,
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report database connectivity through `liveness`.
    pub fn with_database(mut self, liveness: Arc<dyn DatabaseLiveness>) -> Self {
        self.database = Some(liveness);
        self
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail fast during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state. When false, liveness probes emit 503 to trigger restarts.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn database_status(&self) -> DatabaseStatus {
        match &self.database {
            Some(liveness) if liveness.is_connected() => DatabaseStatus::Connected,
            _ => DatabaseStatus::Disconnected,
        }
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Storage backend serving admission writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    /// Requests are served by the in-process fallback store.
    Disconnected,
}

/// Body of `GET /api/health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServerHealth {
    #[schema(example = "OK")]
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseStatus,
}

/// Server summary for humans and uptime checkers.
///
/// Always 200 while the process can answer; `database` reports whether the
/// fallback store is in use.
#[utoipa::path(
    get,
    path = "/api/health",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Server is running", body = ServerHealth))
)]
#[get("/api/health")]
pub async fn api_health(state: web::Data<HealthState>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(ServerHealth {
            status: "OK",
            message: "LMS Server is running",
            timestamp: Utc::now(),
            database: state.database_status(),
        })
}

/// Readiness probe. Return 200 when dependencies are initialised and the server can handle traffic; return 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe. Return 200 while the process is marked alive and 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

/// Register the probes and the summary endpoint.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health).service(ready).service(live);
}
