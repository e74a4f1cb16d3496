//! Influencer Service entry point.

use influencer_service::config::InfluencerConfig;
use influencer_service::startup::Application;

use service_core::observability::init_tracing;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load configuration
    let config = InfluencerConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        otlp_endpoint = ?config.otlp_endpoint,
        "Starting influencer-service"
    );

    // Log configuration (password is never logged)
    tracing::info!(
        service_name = %config.service_name,
        http_port = %config.common.port,
        db_host = %config.database.host,
        db_port = %config.database.port,
        db_name = %config.database.name,
        db_ssl_mode = ?config.database.ssl_mode,
        db_max_connections = %config.database.max_connections,
        table = %config.database.table,
        "Configuration loaded"
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        std::io::Error::other(format!("Application build error: {}", e))
    })?;
    let repository = app.repository();

    // Run with graceful shutdown
    let result = tokio::select! {
        result = app.run_until_stopped() => result,
        _ = shutdown_signal() => {
            tracing::info!("Graceful shutdown initiated");
            Ok(())
        }
    };

    repository.close().await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application error");
    }
    tracing::info!("Service shutdown complete");
    result
}
