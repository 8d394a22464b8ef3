//! `factoryflowd` — the FactoryFlow Lite server binary.
//!
//! Usage:
//!   factoryflowd -c <config-name-or-path> [--listen <addr>]
//!
//! The config name resolves to `/etc/factoryflow/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod bootstrap;
mod config;
mod routes;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use clap::Parser;
use factoryflow_core::Module;
use tracing::info;

use auth_middleware::JwtState;
use config::ServerConfig;

/// FactoryFlow Lite server.
#[derive(Parser, Debug)]
#[command(name = "factoryflowd", about = "FactoryFlow Lite server")]
struct Cli {
    /// Config name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the configured one).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    std::fs::create_dir_all(&server_config.storage.data_dir)?;
    let sql: Arc<dyn factoryflow_sql::SQLStore> = Arc::new(
        factoryflow_sql::SqliteStore::open(&server_config.sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Wire up modules.
    let auth_config = auth::service::AuthConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        access_token_ttl: server_config.jwt.access_ttl_secs,
        refresh_token_ttl: server_config.jwt.refresh_ttl_secs,
    };
    let auth_module = auth::AuthModule::new(Arc::clone(&sql), auth_config)?;
    info!("auth module initialized");

    let workorders_module = workorders::WorkOrdersModule::new(Arc::clone(&sql))?;
    info!("workorders module initialized");

    // Ensure the root user exists.
    bootstrap::ensure_root_user(auth_module.service(), &server_config)?;

    let module_routes = vec![
        (auth_module.name(), auth_module.routes()),
        (workorders_module.name(), workorders_module.routes()),
    ];

    let jwt_state = Arc::new(JwtState::from_secret(&server_config.jwt.secret));
    let app = routes::build_router(jwt_state, module_routes);

    // Start server.
    let listen = cli.listen.unwrap_or_else(|| server_config.server.listen.clone());
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("factoryflowd listening on {listen}");
    axum::serve(listener, app).await?;

    Ok(())
}
