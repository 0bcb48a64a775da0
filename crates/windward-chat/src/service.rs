//! The chat service — one long-lived instance per process, wired through the
//! server state rather than living in a global.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::info;

use windward_core::config::Config;
use windward_core::error::{Result, WindwardError};
use windward_providers::{AssistantProvider, AssistantSpec};
use windward_tools::{ToolContext, ToolRegistry};

use crate::processor;
use crate::prompt::{ASSISTANT_NAME, ASSISTANT_TEMPERATURE, SYSTEM_PROMPT};
use crate::provision::AssistantProvisioner;
use crate::threads::ThreadDirectory;

pub struct ChatService {
    provider: Arc<dyn AssistantProvider>,
    tools: Arc<ToolRegistry>,
    tool_context: ToolContext,
    provisioner: AssistantProvisioner,
    threads: ThreadDirectory,
    extra_args: Option<Map<String, Value>>,
}

impl ChatService {
    pub fn new(
        provider: Arc<dyn AssistantProvider>,
        tools: Arc<ToolRegistry>,
        config: Arc<Config>,
    ) -> Self {
        let spec = AssistantSpec {
            name: ASSISTANT_NAME.to_string(),
            instructions: SYSTEM_PROMPT.to_string(),
            model: config.model(),
            temperature: ASSISTANT_TEMPERATURE,
            tools: tools.to_assistant_tools(),
        };
        let provisioner =
            AssistantProvisioner::new(provider.clone(), config.assistant_id.clone(), spec);
        Self {
            provider,
            tools,
            tool_context: ToolContext { config },
            provisioner,
            threads: ThreadDirectory::new(),
            extra_args: None,
        }
    }

    /// Fixed key/value pairs injected into every tool call's arguments,
    /// overriding model-supplied values of the same key.
    pub fn with_extra_args(mut self, extra_args: Map<String, Value>) -> Self {
        self.extra_args = Some(extra_args);
        self
    }

    /// Generate the streamed reply for one user message.
    ///
    /// Text fragments arrive on `token_tx` as the provider emits them. The
    /// returned future resolves when the run completes; a terminal provider
    /// failure surfaces as [`WindwardError::RunFailed`].
    pub async fn generate(
        &self,
        chat_id: &str,
        content: &str,
        token_tx: mpsc::UnboundedSender<String>,
    ) -> Result<()> {
        let assistant = self.provisioner.ensure_ready().await?;
        let thread_id = self.threads.resolve(self.provider.as_ref(), chat_id).await?;

        self.provider
            .add_user_message(&thread_id, content)
            .await
            .map_err(|e| WindwardError::Provider(e.to_string()))?;

        let initial = self
            .provider
            .stream_run(&thread_id, &assistant.id)
            .await
            .map_err(|e| WindwardError::Provider(e.to_string()))?;

        processor::drive_run(
            self.provider.as_ref(),
            &thread_id,
            initial,
            &self.tools,
            &self.tool_context,
            self.extra_args.as_ref(),
            &token_tx,
        )
        .await?;

        info!(chat_id, "Run completed");
        Ok(())
    }
}
