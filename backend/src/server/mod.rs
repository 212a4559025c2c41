//! Server construction and middleware wiring.

mod bootstrap;
mod config;
mod state_builders;

pub use bootstrap::{BootstrapError, BootstrapOutcome, ensure_bootstrap_admin};
pub use config::{BootstrapAdmin, ServerConfig};
pub use state_builders::{SharedAdapters, build_http_state};

use std::io;
use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    AccountRepository, DatabaseLiveness, LivenessFlag, PasswordHasher,
};
use crate::inbound::http::error::set_expose_internal_details;
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{configure, route_not_found};
use crate::outbound::FailoverAdmissionRepository;
use crate::outbound::documents::LocalDocumentStore;
use crate::outbound::memory::{FallbackAdmissionStore, InMemoryAccountRepository};
use crate::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselAdmissionRepository, MigrationError,
    PoolLivenessMonitor, run_pending_migrations,
};
use crate::outbound::security::{Argon2PasswordHasher, HmacTokenIssuer};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Failures that stop the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open upload directory: {0}")]
    Uploads(#[source] io::Error),
    #[error(transparent)]
    Migrations(#[from] MigrationError),
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    #[error("failed to bind HTTP listener: {0}")]
    Bind(#[source] io::Error),
}

/// Shared state handed to every worker plus the background liveness task.
pub struct AppState {
    pub http_state: web::Data<HttpState>,
    pub health_state: web::Data<HealthState>,
    pub liveness_task: Option<JoinHandle<()>>,
}

/// Assemble the actix application for one worker.
pub fn build_app(
    http_state: web::Data<HttpState>,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(route_not_found))
}

/// Build stores, services and health reporting for `config`.
///
/// With a database configured, migrations run first, accounts live in
/// PostgreSQL and admissions fail over to the in-process store whenever the
/// liveness monitor reports the database unreachable. Without one every
/// store is in-process.
pub async fn build_state(config: &ServerConfig) -> Result<AppState, StartupError> {
    set_expose_internal_details(config.environment.is_development());

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher = Arc::new(Argon2PasswordHasher::new());
    let adapters = SharedAdapters {
        hasher: hasher.clone(),
        tokens: Arc::new(HmacTokenIssuer::new(
            config.token_secret.to_vec(),
            config.token_ttl,
            clock.clone(),
        )),
        documents: Arc::new(
            LocalDocumentStore::open(&config.upload_dir).map_err(StartupError::Uploads)?,
        ),
        clock: clock.clone(),
        max_upload_bytes: config.max_upload_bytes,
    };

    let Some(pool_config) = &config.database else {
        info!(backend = "fallback", "no database configured; using in-process stores");
        let accounts = Arc::new(InMemoryAccountRepository::new());
        bootstrap(config, accounts.as_ref(), hasher.as_ref(), clock.as_ref()).await?;
        let http_state = build_http_state(accounts, Arc::new(FallbackAdmissionStore::new()), &adapters);
        return Ok(AppState {
            http_state: web::Data::new(http_state),
            health_state: web::Data::new(HealthState::new()),
            liveness_task: None,
        });
    };

    info!(target_db = pool_config.display_target(), "using PostgreSQL with fallback store");
    apply_migrations(pool_config.database_url()).await?;

    let pool = DbPool::new_lazy(pool_config);
    let flag = LivenessFlag::new(false);
    let monitor = PoolLivenessMonitor::new(pool.clone(), flag.clone())
        .with_interval(config.liveness_interval);
    monitor.check_once().await;
    let liveness: Arc<dyn DatabaseLiveness> = Arc::new(flag);

    let accounts = Arc::new(DieselAccountRepository::new(pool.clone()));
    if liveness.is_connected() {
        bootstrap(config, accounts.as_ref(), hasher.as_ref(), clock.as_ref()).await?;
    } else if config.bootstrap_admin.is_some() {
        warn!("database unreachable at startup; bootstrap admin not ensured");
    }
    let admissions = Arc::new(FailoverAdmissionRepository::new(
        DieselAdmissionRepository::new(pool),
        FallbackAdmissionStore::new(),
        liveness.clone(),
    ));

    Ok(AppState {
        http_state: web::Data::new(build_http_state(accounts, admissions, &adapters)),
        health_state: web::Data::new(HealthState::new().with_database(liveness)),
        liveness_task: Some(monitor.start()),
    })
}

async fn apply_migrations(database_url: &str) -> Result<(), StartupError> {
    let url = database_url.to_owned();
    let outcome = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .map_err(|err| MigrationError::Apply(err.to_string()))?;
    match outcome {
        Ok(applied) => {
            info!(applied, "database migrations up to date");
            Ok(())
        }
        Err(MigrationError::Connect(error)) => {
            warn!(%error, "database unreachable; skipping migrations and starting in fallback mode");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn bootstrap<A, H>(
    config: &ServerConfig,
    accounts: &A,
    hasher: &H,
    clock: &dyn Clock,
) -> Result<(), StartupError>
where
    A: AccountRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    if let Some(admin) = &config.bootstrap_admin {
        ensure_bootstrap_admin(accounts, hasher, admin, clock.utc()).await?;
    }
    Ok(())
}

/// Construct an Actix HTTP server from `config`.
///
/// Returns the server future plus the liveness task handle, which the caller
/// aborts after the server stops.
///
/// # Errors
/// Fails when storage cannot be prepared or the socket cannot be bound.
pub async fn create_server(
    config: ServerConfig,
) -> Result<(Server, Option<JoinHandle<()>>), StartupError> {
    let AppState {
        http_state,
        health_state,
        liveness_task,
    } = build_state(&config).await?;
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(http_state.clone(), server_health_state.clone())
    })
    .bind(config.bind_addr)
    .map_err(StartupError::Bind)?
    .run();

    info!(addr = %config.bind_addr, environment = ?config.environment, "server listening");
    health_state.mark_ready();
    Ok((server, liveness_task))
}
