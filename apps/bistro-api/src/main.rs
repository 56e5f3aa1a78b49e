//! Bistro API server binary.
//!
//! ```text
//! bistro-api [--config <path>]
//! ```

use std::path::PathBuf;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bistro_api::{create_router, ApiConfig, AppState};
use bistro_core::SETTING_CURRENCY;
use bistro_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,bistro_api=debug,bistro_db=debug,sqlx=warn")),
        )
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Bistro API server...");

    let config = ApiConfig::load(config_path_arg()).context("Failed to load configuration")?;
    info!(
        bind = %config.bind_address(),
        db_path = %config.database.path.display(),
        stripe = config.stripe.webhook_secret.is_some(),
        paypal = config.paypal.is_configured(),
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.database.path).max_connections(config.database.max_connections))
        .await
        .context("Failed to open database")?;
    info!("Database ready");

    if let Some(currency) = &config.store.currency {
        db.settings().set(SETTING_CURRENCY, currency).await?;
        info!(%currency, "Store currency set from configuration");
    }

    let addr = config.bind_address();
    let state = AppState::new(db, config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// `--config <path>` or `--config=<path>`.
fn config_path_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
        warn!(%arg, "Ignoring unknown argument");
    }
    None
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
