use crate::{RelayConfig, RelayService, ws_handler};
use anyhow::{Context, Result};
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Router with the WebSocket endpoint on `config.ws_path`. Every other path,
/// upgrade requests included, answers 404 and is never upgraded.
pub fn router(service: RelayService) -> Router {
    let path = service.config().ws_path.clone();

    Router::new()
        .route(&path, get(ws_handler))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Binds `config.bind` and serves until `shutdown` resolves.
pub async fn serve<F>(config: RelayConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    config.validate()?;

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    serve_with_listener(listener, RelayService::new(config), shutdown).await
}

pub async fn serve_with_listener<F>(
    listener: TcpListener,
    service: RelayService,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("> Relay ready on ws://{}{}", addr, service.config().ws_path);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Relay server failed")?;

    Ok(())
}
