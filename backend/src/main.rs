//! Forum entry-point: loads settings, prepares storage and starts the HTTP
//! server.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use focus::inbound::http::health::HealthState;
use focus::inbound::http::session_config::{BuildMode, session_settings_from_env};
use focus::outbound::avatar::FilesystemAvatarStore;
use focus::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use focus::settings::AppSettings;
use server::{ServerConfig, create_server};

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

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let env = mockable::DefaultEnv::new();
    let session =
        session_settings_from_env(&env, BuildMode::current()).map_err(std::io::Error::other)?;

    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr(),
        settings.upload_path(),
    );

    FilesystemAvatarStore::new(config.avatar_root())
        .ensure_root()
        .await
        .map_err(std::io::Error::other)?;

    let config = match settings.database_url() {
        Some(url) => {
            run_pending_migrations(url)
                .await
                .map_err(std::io::Error::other)?;
            let pool = DbPool::new(
                PoolConfig::new(url).with_max_size(settings.db_max_connections()),
            )
            .await
            .map_err(std::io::Error::other)?;
            info!(max_connections = settings.db_max_connections(), "database pool ready");
            config.with_db_pool(pool)
        }
        None => config,
    };

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
