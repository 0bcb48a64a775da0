//! Router assembly and server lifecycle.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{chat_handler, ping_handler};
use crate::state::AppState;
use crate::ui::ui_router;

/// Start the HTTP server and block until shutdown.
pub async fn start_server(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let bind_addr = state.config.bind_addr();

    // /ping and /chat are registered first so they take priority over the
    // chat page at /.
    let app = Router::new()
        .route("/ping", get(ping_handler))
        .route("/chat/{chat_id}", post(chat_handler))
        .with_state(state)
        .merge(ui_router())
        .layer(CorsLayer::permissive());

    let addr = format!("{bind_addr}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Windward listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(%e, "Failed to install CTRL+C handler");
        return;
    }
    info!("Shutdown signal received");
}
