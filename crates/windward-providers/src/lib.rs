//! Assistant provider abstraction.
//!
//! A provider owns conversation state (threads, runs, token generation) on
//! its side of the wire; this crate exposes the operations the chat service
//! consumes and the [`RunEvent`] model its streams produce. The only
//! implementation today is the OpenAI Assistants v2 API in [`openai`].

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

pub mod openai;
pub mod sse;

/// Desired assistant configuration, reconciled against the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantSpec {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub temperature: f64,
    /// Tool declarations in the provider's wire shape.
    pub tools: Vec<serde_json::Value>,
}

/// Provider-side assistant handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
}

/// Provider-side conversation handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
}

/// A tool invocation requested by the assistant mid-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// JSON-encoded argument object, exactly as the model emitted it.
    pub arguments: String,
}

/// The result of one tool call, submitted back to resume the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

/// Why a run ended without producing further content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Failed,
    Cancelling,
    Cancelled,
    Expired,
    StepFailed,
    StepCancelled,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Failed => "failed",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::StepFailed => "step_failed",
            Self::StepCancelled => "step_cancelled",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event from a streaming run.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Assistant text fragments, in provider order.
    MessageDelta { fragments: Vec<String> },
    /// The run is paused until every listed tool call is answered.
    ActionRequired {
        run_id: String,
        tool_calls: Vec<ToolCallRequest>,
    },
    /// The run ended without further content; no events follow.
    TerminalFailure { reason: FailureReason },
}

/// A single-consumption, ordered sequence of run events.
pub type RunEventStream = Pin<Box<dyn Stream<Item = anyhow::Result<RunEvent>> + Send>>;

/// The operations the chat service consumes from a provider.
#[async_trait]
pub trait AssistantProvider: Send + Sync {
    async fn create_assistant(&self, spec: &AssistantSpec) -> anyhow::Result<Assistant>;

    async fn retrieve_assistant(&self, assistant_id: &str) -> anyhow::Result<Assistant>;

    async fn update_assistant(
        &self,
        assistant_id: &str,
        spec: &AssistantSpec,
    ) -> anyhow::Result<Assistant>;

    /// Create a conversation thread tagged with the given metadata.
    async fn create_thread(&self, metadata: serde_json::Value) -> anyhow::Result<Thread>;

    async fn retrieve_thread(&self, thread_id: &str) -> anyhow::Result<Thread>;

    async fn add_user_message(&self, thread_id: &str, content: &str) -> anyhow::Result<()>;

    /// Start a streaming run for the thread.
    async fn stream_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> anyhow::Result<RunEventStream>;

    /// Submit a complete batch of tool outputs; the provider resumes the run
    /// as a new streaming sub-sequence.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> anyhow::Result<RunEventStream>;
}
