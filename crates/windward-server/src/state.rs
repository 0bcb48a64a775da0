//! Shared server state.

use std::sync::Arc;

use windward_chat::ChatService;
use windward_core::config::Config;

/// State shared by all request handlers. Constructed once at startup and
/// passed by handle; there is no ambient global service instance.
pub struct AppState {
    pub config: Arc<Config>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(config: Arc<Config>, chat: Arc<ChatService>) -> Self {
        Self { config, chat }
    }
}
