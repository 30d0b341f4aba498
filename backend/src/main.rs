//! Backend entry-point: loads settings, selects a storage backend and
//! serves the capacity API.

mod server;

use actix_web::web;
use color_eyre::eyre::WrapErr;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use capacity_backend::domain::DEFAULT_HASH_COST;
use capacity_backend::inbound::http::health::HealthState;
use capacity_backend::inbound::http::session_config::{BuildMode, SessionSettings};
use capacity_backend::inbound::http::state::HttpStateConfig;

use server::{AppSettings, ServerConfig, build_storage_ports, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load configuration")?;
    let bind_addr = settings.bind_addr()?;
    let storage = settings.storage()?;
    let session = SessionSettings::from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;

    let ports = build_storage_ports(&storage)
        .await
        .wrap_err("failed to initialise storage")?;
    let http = HttpStateConfig {
        fixtures_dir: settings.fixtures_dir(),
        hash_cost: DEFAULT_HASH_COST,
    };

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(session, bind_addr, ports).with_http_config(http);
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "capacity backend listening");
    server.await?;
    Ok(())
}
