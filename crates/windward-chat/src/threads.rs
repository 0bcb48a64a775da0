//! Thread directory — maps caller chat ids to provider thread handles.

use std::collections::HashMap;

use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use windward_core::error::{Result, WindwardError};
use windward_providers::AssistantProvider;

/// One live thread per chat id, created lazily.
///
/// Known limitation: there is no per-key lock around create-on-miss, so two
/// concurrent first requests for the same chat id can each create a thread;
/// the last insert wins and the other thread is orphaned at the provider.
#[derive(Default)]
pub struct ThreadDirectory {
    map: RwLock<HashMap<String, String>>,
}

impl ThreadDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the thread for `chat_id`, creating one if the cached handle is
    /// missing or no longer retrievable. A stale handle silently loses the
    /// prior turn context.
    pub async fn resolve(
        &self,
        provider: &dyn AssistantProvider,
        chat_id: &str,
    ) -> Result<String> {
        let cached = self.map.read().await.get(chat_id).cloned();
        if let Some(thread_id) = cached {
            match provider.retrieve_thread(&thread_id).await {
                Ok(thread) => return Ok(thread.id),
                Err(e) => {
                    warn!(%e, chat_id, thread_id, "Cached thread unresolvable, starting fresh");
                }
            }
        }

        let thread = provider
            .create_thread(json!({ "chat_id": chat_id }))
            .await
            .map_err(|e| WindwardError::Thread(e.to_string()))?;
        debug!(chat_id, thread_id = %thread.id, "Thread created");
        self.map
            .write()
            .await
            .insert(chat_id.to_string(), thread.id.clone());
        Ok(thread.id)
    }
}
