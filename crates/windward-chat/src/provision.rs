//! Assistant provisioning — reconcile the provider-side assistant with the
//! desired configuration, once per process.
//!
//! Known limitation: `ensure_ready` does not lock around the first
//! reconcile, so the first-ever requests racing each other can each perform
//! the retrieve/update (or create) round-trips; the last cached result wins.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use windward_core::error::{Result, WindwardError};
use windward_providers::{Assistant, AssistantProvider, AssistantSpec};

pub struct AssistantProvisioner {
    provider: Arc<dyn AssistantProvider>,
    configured_id: Option<String>,
    spec: AssistantSpec,
    cached: RwLock<Option<Assistant>>,
}

impl AssistantProvisioner {
    pub fn new(
        provider: Arc<dyn AssistantProvider>,
        configured_id: Option<String>,
        spec: AssistantSpec,
    ) -> Self {
        Self {
            provider,
            configured_id,
            spec,
            cached: RwLock::new(None),
        }
    }

    /// Return the reconciled assistant, provisioning it on first use.
    ///
    /// Success is cached for the life of this provisioner. Failure leaves the
    /// cache unset: the turn that needed the assistant fails at run start,
    /// and the next turn retries provisioning from scratch.
    pub async fn ensure_ready(&self) -> Result<Assistant> {
        if let Some(assistant) = self.cached.read().await.clone() {
            return Ok(assistant);
        }
        let assistant = self.reconcile().await?;
        *self.cached.write().await = Some(assistant.clone());
        Ok(assistant)
    }

    async fn reconcile(&self) -> Result<Assistant> {
        if let Some(id) = &self.configured_id {
            match self.provider.retrieve_assistant(id).await {
                Ok(existing) => {
                    // Push the desired instructions/tools/temperature; a
                    // failed update keeps the retrieved assistant usable.
                    return match self.provider.update_assistant(&existing.id, &self.spec).await {
                        Ok(updated) => Ok(updated),
                        Err(e) => {
                            warn!(%e, assistant_id = %existing.id, "Assistant update failed");
                            Ok(existing)
                        }
                    };
                }
                Err(e) => {
                    warn!(%e, assistant_id = %id, "Assistant retrieval failed, creating a new one");
                }
            }
        }

        match self.provider.create_assistant(&self.spec).await {
            Ok(assistant) => {
                info!(assistant_id = %assistant.id, "Assistant created");
                Ok(assistant)
            }
            Err(e) => {
                error!(%e, "Assistant creation failed");
                Err(WindwardError::Provider(format!(
                    "assistant unavailable: {e}"
                )))
            }
        }
    }
}
