use chat_gateway::{build_router, config::GatewayConfig, services::HuggingFaceClient, AppState};
use service_core::error::AppError;
use service_core::observability::init_tracing;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast if invalid
    let config = GatewayConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting chat gateway"
    );

    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set; signing sessions with the development default");
    }

    let inference = HuggingFaceClient::new(&config.inference)
        .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;
    if !inference.is_configured() {
        tracing::warn!("HF_API_KEY is not set; /chat will respond with a configuration error");
    }

    let state = AppState::in_memory(config.clone(), Arc::new(inference));
    tracing::info!(
        requests = config.rate_limit.requests,
        window_seconds = config.rate_limit.window_seconds,
        "Rate limiter initialized"
    );

    // Closed windows are never read again, so their counters can go.
    let limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        loop {
            interval.tick().await;
            limiter.purge_stale();
            tracing::debug!(tracked = limiter.tracked_keys(), "Purged stale rate-limit windows");
        }
    });

    let app = build_router(state)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));

    let service_span = tracing::info_span!(
        "service",
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
    );
    let _guard = service_span.enter();

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
