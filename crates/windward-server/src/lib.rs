//! Axum HTTP server for Windward.

pub mod routes;
pub mod server;
pub mod state;
pub mod stream;
pub mod ui;

pub use server::start_server;
pub use state::AppState;
