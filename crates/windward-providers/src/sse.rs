//! Incremental SSE (Server-Sent Events) parser.
//!
//! Turns a byte stream into a stream of [`SseEvent`]s. Chunk boundaries are
//! arbitrary: a single event may span several network reads, and one read may
//! carry several events.

use futures::Stream;
use tokio_stream::StreamExt;

/// A parsed SSE event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

/// Accumulates `event:`/`data:` fields until a blank line dispatches them.
#[derive(Debug, Default)]
struct EventBuilder {
    event: Option<String>,
    data: Vec<String>,
}

impl EventBuilder {
    /// Feed one line (without its terminator). Returns a complete event when
    /// the line was the blank dispatch line.
    fn feed_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.flush();
        }
        if line.starts_with(':') {
            // Comment line.
            return None;
        }
        if let Some(value) = line.strip_prefix("event:") {
            self.event = Some(value.trim_start().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            self.data.push(value.trim_start().to_string());
        }
        // Unknown fields (id:, retry:, ...) are ignored.
        None
    }

    fn flush(&mut self) -> Option<SseEvent> {
        if self.data.is_empty() && self.event.is_none() {
            return None;
        }
        Some(SseEvent {
            event: self.event.take(),
            data: std::mem::take(&mut self.data).join("\n"),
        })
    }
}

struct SseState<S> {
    bytes: S,
    buffer: String,
    builder: EventBuilder,
    done: bool,
}

/// Parse a byte stream as SSE.
///
/// Generic over the byte source so tests can feed synthetic chunks; the
/// OpenAI client passes `response.bytes_stream().boxed()`.
pub fn parse_sse_stream<S, E>(bytes: S) -> impl Stream<Item = anyhow::Result<SseEvent>>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    futures::stream::unfold(
        SseState {
            bytes,
            buffer: String::new(),
            builder: EventBuilder::default(),
            done: false,
        },
        |mut state| async move {
            if state.done {
                return None;
            }
            loop {
                // Drain complete lines already buffered.
                while let Some(newline) = state.buffer.find('\n') {
                    let line = state.buffer[..newline].trim_end_matches('\r').to_string();
                    state.buffer.drain(..=newline);
                    if let Some(event) = state.builder.feed_line(&line) {
                        return Some((Ok(event), state));
                    }
                }

                match state.bytes.next().await {
                    Some(Ok(chunk)) => {
                        state.buffer.push_str(&String::from_utf8_lossy(&chunk));
                    }
                    Some(Err(e)) => {
                        state.done = true;
                        return Some((Err(anyhow::anyhow!(e).context("SSE stream error")), state));
                    }
                    None => {
                        state.done = true;
                        // A final event without a trailing blank line still counts.
                        return state.builder.flush().map(|event| (Ok(event), state));
                    }
                }
            }
        },
    )
}
