//! Stream adapter — frames the flattened token sequence for the client.
//!
//! Tokens that already carry an SSE frame marker pass through untouched so
//! raw text deltas and pre-serialized structured events can share one
//! response stream.

use std::convert::Infallible;

use bytes::Bytes;
use futures::Stream;
use tokio_stream::StreamExt;

const FRAME_MARKERS: [&str; 2] = ["data:", "event:"];

fn is_preframed(unit: &str) -> bool {
    FRAME_MARKERS.iter().any(|m| unit.starts_with(m))
}

/// Wrap one unit in a standard frame unless it is already framed.
pub fn frame(unit: &str) -> String {
    if is_preframed(unit) {
        unit.to_string()
    } else {
        format!("data: {unit}\n\n")
    }
}

/// A pre-framed error event, emitted when a run fails after streaming began.
pub fn error_frame(message: &str) -> String {
    let payload = serde_json::json!({ "status": "error", "message": message });
    format!("event: error\ndata: {payload}\n\n")
}

/// Adapt a token stream into a framed byte stream for the response body.
pub fn framed_body<S>(tokens: S) -> impl Stream<Item = Result<Bytes, Infallible>>
where
    S: Stream<Item = String>,
{
    tokens.map(|token| Ok(Bytes::from(frame(&token))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_wraps_plain_tokens() {
        assert_eq!(frame("Hello"), "data: Hello\n\n");
    }

    #[test]
    fn test_frame_passes_preframed_data_through() {
        assert_eq!(frame("data: already\n\n"), "data: already\n\n");
    }

    #[test]
    fn test_frame_passes_preframed_events_through() {
        let e = error_frame("Run failed");
        assert_eq!(frame(&e), e);
    }

    #[test]
    fn test_error_frame_shape() {
        let e = error_frame("Run failed: expired");
        assert!(e.starts_with("event: error\ndata: "));
        assert!(e.ends_with("\n\n"));
        let json_part = e
            .trim_end()
            .strip_prefix("event: error\ndata: ")
            .unwrap();
        let payload: serde_json::Value = serde_json::from_str(json_part).unwrap();
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["message"], "Run failed: expired");
    }

    #[tokio::test]
    async fn test_framed_body_preserves_order() {
        let tokens = futures::stream::iter(vec!["a".to_string(), "b".to_string()]);
        let mut body = std::pin::pin!(framed_body(tokens));
        let mut collected = String::new();
        while let Some(Ok(chunk)) = body.next().await {
            collected.push_str(&String::from_utf8_lossy(&chunk));
        }
        assert_eq!(collected, "data: a\n\ndata: b\n\n");
    }
}
