//! Request handlers.

use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error};

use windward_core::error::WindwardError;

use crate::state::AppState;
use crate::stream::{error_frame, framed_body};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_query: String,
}

/// Health check.
pub async fn ping_handler() -> impl IntoResponse {
    Json(json!({ "message": "Application is Running!", "status": "success" }))
}

/// Stream the assistant's reply for one user message.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let (token_tx, token_rx) = mpsc::unbounded_channel();
    let chat = state.chat.clone();

    tokio::spawn(async move {
        match chat.generate(&chat_id, &request.user_query, token_tx.clone()).await {
            Ok(()) => debug!(chat_id, "Chat stream finished"),
            // The receiver is gone; nothing left to tell anyone.
            Err(WindwardError::ClientGone) => debug!(chat_id, "Client went away mid-stream"),
            Err(e) => {
                error!(chat_id, %e, "Chat run failed");
                // Headers are long gone, so the failure rides the stream
                // as an explicit error frame rather than a status code.
                let _ = token_tx.send(error_frame(&e.to_string()));
            }
        }
    });

    let body = Body::from_stream(framed_body(UnboundedReceiverStream::new(token_rx)));
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}
