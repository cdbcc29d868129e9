//! Backend entry-point: loads settings, prepares storage and serves HTTP.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use classdesk::inbound::http::health::HealthState;
use classdesk::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use classdesk::settings::AppSettings;
use server::{ServerConfig, create_server};

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

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| color_eyre::eyre::eyre!("load settings: {err}"))?;
    let mut config = ServerConfig::from_settings(&settings)?;

    if let Some(database_url) = settings.database_url.as_deref() {
        run_migrations(database_url)
            .await
            .wrap_err("apply database migrations")?;
        let pool_config =
            PoolConfig::new(database_url).with_max_size(settings.db_max_connections());
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("build database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %config.bind_addr(), "starting classdesk backend");
    let server = create_server(health_state, config)?;
    server.await.wrap_err("server terminated")
}
