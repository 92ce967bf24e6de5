//! Backend entry-point: loads settings, selects storage, and serves the API.

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use clinic_backend::inbound::http::health::HealthState;
use clinic_backend::inbound::http::session_config::{BuildMode, token_settings_from_env};
use clinic_backend::outbound::memory::InMemoryStore;
use clinic_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use clinic_backend::server::{ServerSettings, Storage, build_http_state, create_server};

async fn select_storage(settings: &ServerSettings) -> Result<Storage> {
    let Some(url) = settings.database_url.as_deref() else {
        warn!("no database URL configured; data is kept in memory");
        return Ok(Storage::Memory(InMemoryStore::new()));
    };
    run_migrations(url).await.wrap_err("apply migrations")?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_size()))
        .await
        .wrap_err("build database pool")?;
    Ok(Storage::Postgres(pool))
}

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

    let settings = ServerSettings::load().wrap_err("load server settings")?;
    let tokens = token_settings_from_env(
        &DefaultEnv::new(),
        BuildMode::from_debug_assertions(),
        settings.production,
    )
    .wrap_err("load session token settings")?;

    let storage = select_storage(&settings).await?;
    let mut health = HealthState::new();
    if let Some(probe) = storage.readiness_probe() {
        health = health.with_probe(probe);
    }
    let health_state = web::Data::new(health);
    let http_state = build_http_state(&storage, &tokens);

    let bind_addr = settings.bind_addr();
    let server = create_server(health_state, http_state, bind_addr)
        .wrap_err_with(|| format!("bind {bind_addr}"))?;
    info!(%bind_addr, production = settings.production, "server listening");
    server.await.wrap_err("server terminated")
}
