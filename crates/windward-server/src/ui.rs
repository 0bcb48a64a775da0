//! Embedded chat page served at the root.
//!
//! Uses `rust-embed` to bake the `ui/` directory into the binary. In debug
//! mode (`debug-embed` feature), files are read from disk so the page can be
//! edited without a rebuild.

use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "ui/"]
struct UiAssets;

/// Router serving the embedded chat page.
pub fn ui_router() -> Router {
    Router::new().route("/", get(index_handler))
}

async fn index_handler() -> Response {
    match UiAssets::get("index.html") {
        Some(asset) => {
            let mime = mime_guess::from_path("index.html").first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                asset.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, Html("<h1>404</h1>")).into_response(),
    }
}
