//! OpenAI Assistants v2 API provider.
//!
//! Threads, runs, and token generation live on OpenAI's side; this client
//! drives them over HTTP and decodes the run event stream into [`RunEvent`]s.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, trace};

use crate::sse::{SseEvent, parse_sse_stream};
use crate::{
    Assistant, AssistantProvider, AssistantSpec, FailureReason, RunEvent, RunEventStream, Thread,
    ToolCallRequest, ToolOutput,
};

const OPENAI_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAiAssistants {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiAssistants {
    pub fn new(api_key: impl Into<String>, base_url: Option<&str>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or(OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Beta", "assistants=v2")
            .header("content-type", "application/json")
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> anyhow::Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error {status}: {body}");
        }
        Ok(response.json().await?)
    }

    /// Open a streaming request and decode its SSE body into run events.
    async fn open_event_stream(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> anyhow::Result<RunEventStream> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error {status}: {body}");
        }

        let sse = parse_sse_stream(response.bytes_stream().boxed());
        let events = futures::stream::unfold(Box::pin(sse), |mut sse| async move {
            loop {
                match sse.next().await {
                    Some(Ok(event)) => match decode_event(&event) {
                        Ok(Decoded::Event(run_event)) => return Some((Ok(run_event), sse)),
                        Ok(Decoded::Skip) => continue,
                        Ok(Decoded::Done) => return None,
                        Err(e) => return Some((Err(e), sse)),
                    },
                    Some(Err(e)) => return Some((Err(e), sse)),
                    None => return None,
                }
            }
        });
        Ok(Box::pin(events))
    }

    fn spec_body(spec: &AssistantSpec) -> serde_json::Value {
        json!({
            "name": spec.name,
            "instructions": spec.instructions,
            "model": spec.model,
            "tools": spec.tools,
            "temperature": spec.temperature,
        })
    }
}

enum Decoded {
    Event(RunEvent),
    Skip,
    Done,
}

// --- wire shapes (only the fields we read) ---

#[derive(Debug, Deserialize)]
struct MessageDeltaObject {
    delta: MessageDelta,
}

#[derive(Debug, Deserialize)]
struct MessageDelta {
    #[serde(default)]
    content: Vec<DeltaContent>,
}

#[derive(Debug, Deserialize)]
struct DeltaContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<DeltaText>,
}

#[derive(Debug, Deserialize)]
struct DeltaText {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    #[serde(default)]
    required_action: Option<RequiredAction>,
}

#[derive(Debug, Deserialize)]
struct RequiredAction {
    submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Debug, Deserialize)]
struct SubmitToolOutputs {
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn decode_event(event: &SseEvent) -> anyhow::Result<Decoded> {
    let data = event.data.trim();
    if data == "[DONE]" {
        return Ok(Decoded::Done);
    }

    let reason = match event.event.as_deref() {
        Some("done") => return Ok(Decoded::Done),
        Some("thread.message.delta") => {
            let object: MessageDeltaObject = serde_json::from_str(data)?;
            let fragments: Vec<String> = object
                .delta
                .content
                .into_iter()
                .filter(|c| c.kind == "text")
                .filter_map(|c| c.text.and_then(|t| t.value))
                .collect();
            return Ok(Decoded::Event(RunEvent::MessageDelta { fragments }));
        }
        Some("thread.run.requires_action") => {
            let run: RunObject = serde_json::from_str(data)?;
            let tool_calls = run
                .required_action
                .map(|a| a.submit_tool_outputs.tool_calls)
                .unwrap_or_default()
                .into_iter()
                .map(|c| ToolCallRequest {
                    id: c.id,
                    name: c.function.name,
                    arguments: c.function.arguments,
                })
                .collect();
            return Ok(Decoded::Event(RunEvent::ActionRequired {
                run_id: run.id,
                tool_calls,
            }));
        }
        Some("thread.run.failed") => FailureReason::Failed,
        Some("thread.run.cancelling") => FailureReason::Cancelling,
        Some("thread.run.cancelled") => FailureReason::Cancelled,
        Some("thread.run.expired") => FailureReason::Expired,
        Some("thread.run.step.failed") => FailureReason::StepFailed,
        Some("thread.run.step.cancelled") => FailureReason::StepCancelled,
        other => {
            // run.created, step deltas, message lifecycle, etc.
            trace!(event = ?other, "Skipping run event");
            return Ok(Decoded::Skip);
        }
    };
    Ok(Decoded::Event(RunEvent::TerminalFailure { reason }))
}

#[async_trait]
impl AssistantProvider for OpenAiAssistants {
    async fn create_assistant(&self, spec: &AssistantSpec) -> anyhow::Result<Assistant> {
        debug!(model = %spec.model, "Creating assistant");
        self.send_json(
            self.request(reqwest::Method::POST, "/v1/assistants")
                .json(&Self::spec_body(spec)),
        )
        .await
    }

    async fn retrieve_assistant(&self, assistant_id: &str) -> anyhow::Result<Assistant> {
        self.send_json(self.request(
            reqwest::Method::GET,
            &format!("/v1/assistants/{assistant_id}"),
        ))
        .await
    }

    async fn update_assistant(
        &self,
        assistant_id: &str,
        spec: &AssistantSpec,
    ) -> anyhow::Result<Assistant> {
        debug!(assistant_id, "Updating assistant");
        self.send_json(
            self.request(
                reqwest::Method::POST,
                &format!("/v1/assistants/{assistant_id}"),
            )
            .json(&json!({
                "instructions": spec.instructions,
                "tools": spec.tools,
                "temperature": spec.temperature,
            })),
        )
        .await
    }

    async fn create_thread(&self, metadata: serde_json::Value) -> anyhow::Result<Thread> {
        self.send_json(
            self.request(reqwest::Method::POST, "/v1/threads")
                .json(&json!({ "metadata": metadata })),
        )
        .await
    }

    async fn retrieve_thread(&self, thread_id: &str) -> anyhow::Result<Thread> {
        self.send_json(self.request(reqwest::Method::GET, &format!("/v1/threads/{thread_id}")))
            .await
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> anyhow::Result<()> {
        let _: serde_json::Value = self
            .send_json(
                self.request(
                    reqwest::Method::POST,
                    &format!("/v1/threads/{thread_id}/messages"),
                )
                .json(&json!({ "role": "user", "content": content })),
            )
            .await?;
        Ok(())
    }

    async fn stream_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> anyhow::Result<RunEventStream> {
        debug!(thread_id, assistant_id, "Starting streaming run");
        self.open_event_stream(
            self.request(reqwest::Method::POST, &format!("/v1/threads/{thread_id}/runs"))
                .json(&json!({ "assistant_id": assistant_id, "stream": true })),
        )
        .await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> anyhow::Result<RunEventStream> {
        debug!(thread_id, run_id, count = outputs.len(), "Submitting tool outputs");
        self.open_event_stream(
            self.request(
                reqwest::Method::POST,
                &format!("/v1/threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            )
            .json(&json!({ "tool_outputs": outputs, "stream": true })),
        )
        .await
    }
}
