//! Server-sent event framing for streamed completions
//!
//! Turns the raw response body into decoded chunks: one `data:` payload per
//! chunk, ending at the `[DONE]` sentinel.

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};

use crate::error::LlmError;
use crate::protocol::openai::OpenAiStreamChunk;

/// Payload that terminates a completion stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Decode an SSE byte stream into chat-completion chunks
///
/// Payloads that fail to parse are skipped. A framing or transport error is
/// forwarded once and ends the stream.
pub fn decode_chunks<S, B, E>(bytes: S) -> impl Stream<Item = Result<OpenAiStreamChunk, LlmError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    async_stream::stream! {
        let mut events = std::pin::pin!(bytes.eventsource());

        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    let data = event.data.trim();
                    if data == DONE_SENTINEL {
                        return;
                    }
                    if data.is_empty() {
                        continue;
                    }

                    match serde_json::from_str::<OpenAiStreamChunk>(data) {
                        Ok(chunk) => yield Ok(chunk),
                        Err(e) => {
                            tracing::debug!(error = %e, data = %data, "skipping unparseable SSE payload");
                        }
                    }
                }
                Err(e) => {
                    let message = e.to_string();
                    yield Err(LlmError::Streaming(message));
                    return;
                }
            }
        }
    }
}
