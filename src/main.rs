use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tracing::{info, warn};

use clinic_booking_api::api::create_router;
use clinic_booking_api::app::{AppConfig, AppState};
use clinic_booking_api::infra::{PostgresClient, init_metrics_handle, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);

    let metrics = init_metrics_handle();
    if metrics.is_none() {
        warn!("Prometheus recorder not installed; /metrics disabled");
    }

    let db_client = PostgresClient::with_defaults(config.database_url.expose_secret())
        .await
        .context("failed to connect to the database")?;

    if config.run_migrations {
        db_client
            .run_migrations()
            .await
            .context("failed to run migrations")?;
        info!("Migrations applied");
    }

    let app_state = Arc::new(AppState::new(Arc::new(db_client)).with_metrics(metrics));
    let router = create_router(app_state);

    let listener = TcpListener::bind(config.server_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server_addr))?;

    info!(addr = %config.server_addr, "Server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
