//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use std::ffi::OsString;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use rental_backend::inbound::http::health::HealthState;
use rental_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use rental_backend::seed::seed_residencies;
use rental_backend::settings::AppSettings;

use server::{PersistentServices, ServerConfig, build_persistent_services, create_server};

fn load_settings() -> std::io::Result<AppSettings> {
    let args: Vec<OsString> = std::env::args_os().collect();
    AppSettings::load_from_iter(args)
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = load_settings()?;
    let Some(database_url) = settings.database_url() else {
        error!("RENTAL_DATABASE_URL is not set");
        return Err(std::io::Error::other("RENTAL_DATABASE_URL must be set"));
    };

    match settings.identity() {
        Ok(Some(identity)) => info!(
            domain = %identity.domain,
            client_id = %identity.client_id,
            audience = identity.audience.as_deref().unwrap_or("<none>"),
            "identity provider configured"
        ),
        Ok(None) => warn!("identity provider not configured; clients will run unauthenticated"),
        Err(err) => {
            error!(error = %err, "invalid identity provider settings");
            return Err(std::io::Error::other(err.to_string()));
        }
    }

    run_migrations(database_url)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.pool_max_size()),
    )
    .await
    .map_err(|err| std::io::Error::other(err.to_string()))?;

    let PersistentServices {
        residencies,
        residency_service,
        http_state,
    } = build_persistent_services(&pool, Arc::new(DefaultClock));

    if let Some(path) = settings.seed_path.as_deref() {
        match seed_residencies(path, residencies.as_ref(), residency_service.as_ref()).await {
            Ok(outcome) => info!(?outcome, "startup seeding finished"),
            Err(err) => warn!(error = %err, "startup seeding failed; continuing"),
        }
    }

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(settings.bind_addr(), settings.client_origin());
    let server = create_server(health_state, http_state, config)?;
    server.await
}
