use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::handlers;
use crate::service;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Start(#[from] service::ServiceStartError),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Parses configuration, wires the application, and serves HTTP until a
/// shutdown signal arrives — the same load-config/build-service/run split
/// the teacher's `command::run` draws around `service::new_full`.
pub async fn run() -> Result<(), RunError> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    tracing::info!(target: "ledger-service", environment = %config.environment, "starting ledger-service");

    ledger_decimal::init(ledger_decimal::Precision::default());

    let state = service::build_state(&config).await?;
    let app = handlers::router(state);

    let addr = config.socket_addr();
    tracing::info!(target: "ledger-service", %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(target: "ledger-service", "shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!(target: "ledger-service", "shutdown signal received");
}
