//! Conversation event processor — the run event loop.
//!
//! Consumes the streaming run, forwards text deltas as they arrive, resolves
//! action-required events by fanning out tool calls, and feeds the provider's
//! resumed sub-streams back into the loop. Sub-streams go onto an explicit
//! work queue instead of recursing, so nesting depth never grows the stack.

use std::collections::VecDeque;

use futures::StreamExt;
use futures::future::join_all;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use windward_core::error::{Result, WindwardError};
use windward_providers::{AssistantProvider, RunEvent, RunEventStream, ToolCallRequest, ToolOutput};
use windward_tools::{ToolContext, ToolRegistry};

/// Drive a run to completion, sending text fragments to `token_tx`.
///
/// Returns `RunFailed` on any terminal failure event and `ClientGone` when
/// the token receiver is dropped; both stop further upstream reads.
pub async fn drive_run(
    provider: &dyn AssistantProvider,
    thread_id: &str,
    initial: RunEventStream,
    tools: &ToolRegistry,
    tool_context: &ToolContext,
    extra_args: Option<&Map<String, Value>>,
    token_tx: &mpsc::UnboundedSender<String>,
) -> Result<()> {
    let mut queue: VecDeque<RunEventStream> = VecDeque::new();
    queue.push_back(initial);

    while let Some(mut events) = queue.pop_front() {
        while let Some(event) = events.next().await {
            match event.map_err(|e| WindwardError::Provider(e.to_string()))? {
                RunEvent::MessageDelta { fragments } => {
                    for fragment in fragments {
                        token_tx
                            .send(fragment)
                            .map_err(|_| WindwardError::ClientGone)?;
                    }
                }
                RunEvent::ActionRequired { run_id, tool_calls } => {
                    debug!(run_id, count = tool_calls.len(), "Run requires action");
                    let outputs =
                        resolve_tool_calls(tools, tool_context, tool_calls, extra_args).await;
                    let resumed = provider
                        .submit_tool_outputs(thread_id, &run_id, &outputs)
                        .await
                        .map_err(|e| WindwardError::Provider(e.to_string()))?;
                    queue.push_back(resumed);
                }
                RunEvent::TerminalFailure { reason } => {
                    return Err(WindwardError::RunFailed(reason.to_string()));
                }
            }
        }
    }
    Ok(())
}

/// Resolve every tool call in one action-required batch concurrently.
///
/// Each call yields exactly one output; failures stay inside their own call
/// and come back as result text the assistant can react to.
pub async fn resolve_tool_calls(
    tools: &ToolRegistry,
    context: &ToolContext,
    calls: Vec<ToolCallRequest>,
    extra_args: Option<&Map<String, Value>>,
) -> Vec<ToolOutput> {
    join_all(
        calls
            .into_iter()
            .map(|call| resolve_tool_call(tools, context, call, extra_args)),
    )
    .await
}

async fn resolve_tool_call(
    tools: &ToolRegistry,
    context: &ToolContext,
    call: ToolCallRequest,
    extra_args: Option<&Map<String, Value>>,
) -> ToolOutput {
    let output = match parse_arguments(&call.arguments, extra_args) {
        Err(e) => {
            warn!(tool = %call.name, %e, "Tool arguments did not parse");
            e.to_string()
        }
        Ok(args) => match tools.get(&call.name) {
            None => {
                warn!(tool = %call.name, "Tool not found");
                "Tool not found".to_string()
            }
            Some(tool) => match tool.invoke(args, context).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(tool = %call.name, %e, "Tool execution failed");
                    e.to_string()
                }
            },
        },
    };
    ToolOutput {
        tool_call_id: call.id,
        output,
    }
}

/// Parse the model-supplied argument string, then overlay the fixed extras.
fn parse_arguments(
    raw: &str,
    extra_args: Option<&Map<String, Value>>,
) -> serde_json::Result<Map<String, Value>> {
    let mut args: Map<String, Value> = serde_json::from_str(raw)?;
    if let Some(extras) = extra_args {
        for (key, value) in extras {
            args.insert(key.clone(), value.clone());
        }
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments_plain() {
        let args = parse_arguments(r#"{"latitude":51.5}"#, None).unwrap();
        assert_eq!(args["latitude"], serde_json::json!(51.5));
    }

    #[test]
    fn test_parse_arguments_extras_override() {
        let mut extras = Map::new();
        extras.insert("unit".into(), serde_json::json!("metric"));
        let args =
            parse_arguments(r#"{"latitude":51.5,"unit":"imperial"}"#, Some(&extras)).unwrap();
        assert_eq!(args["unit"], serde_json::json!("metric"));
        assert_eq!(args["latitude"], serde_json::json!(51.5));
    }

    #[test]
    fn test_parse_arguments_rejects_non_object() {
        assert!(parse_arguments("[1,2]", None).is_err());
        assert!(parse_arguments("not json", None).is_err());
    }
}
