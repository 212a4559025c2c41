//! Backend entry-point: loads settings and serves the REST API.

use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use institute::server::{ServerConfig, create_server};
use institute::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let config = ServerConfig::from_settings(&settings).wrap_err("invalid settings")?;
    let (server, liveness_task) = create_server(config)
        .await
        .wrap_err("failed to start server")?;

    let outcome = server.await;
    if let Some(task) = liveness_task {
        task.abort();
    }
    info!("server stopped");
    outcome.wrap_err("server terminated with an error")
}
