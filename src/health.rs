use axum::routing::get;
use axum::Router;
use kalenteribotti::error::BotResult;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Routes answering liveness probes
pub fn router() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

/// Bind the health check listener
pub async fn bind(addr: &str) -> BotResult<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    info!("Health check listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Serve health checks until `cancel` fires
pub async fn serve(listener: TcpListener, cancel: CancellationToken) -> BotResult<()> {
    axum::serve(listener, router())
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    info!("Health check server stopped");
    Ok(())
}
