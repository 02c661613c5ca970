//! Inbound: streamed chat-completions chunks -> vendor-neutral responses
//!
//! Text deltas are forwarded as soon as they arrive. Call fragments are held
//! in a [`CallWindow`] until the window closes, then parsed and emitted once.
//! A window closes when a chunk finishes with `function_call`/`tool_calls`,
//! when a chunk arrives without call fragments after some were seen, or when
//! the stream ends.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use indexmap::IndexMap;

use super::arguments::parse_arguments;
use super::finish::{is_call_finish, map_finish_reason};
use super::response::assemble;
use crate::error::LlmError;
use crate::ids::CallIdGenerator;
use crate::protocol::openai::{OpenAiStreamChunk, OpenAiStreamFunctionCall, OpenAiStreamToolCall};
use crate::types::{Candidate, FinishReason, FunctionCall, GenerationResponse, Part, Turn, UsageMetadata};

/// Fragments of one call collected so far
#[derive(Debug, Default)]
struct PartialCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

impl PartialCall {
    /// Finalize into a call; nameless calls are dropped
    fn complete(self, ids: &dyn CallIdGenerator) -> Option<FunctionCall> {
        let Some(name) = self.name.filter(|name| !name.is_empty()) else {
            tracing::debug!(arguments = %self.arguments, "dropping call fragments that never carried a name");
            return None;
        };

        let args = parse_arguments(&name, &self.arguments);
        Some(FunctionCall {
            id: Some(self.id.filter(|id| !id.is_empty()).unwrap_or_else(|| ids.next_id())),
            name,
            args,
        })
    }
}

/// Calls in flight within one window, under either convention
#[derive(Debug, Default)]
struct CallWindow {
    legacy: Option<PartialCall>,
    indexed: IndexMap<u32, PartialCall>,
}

impl CallWindow {
    fn push_legacy(&mut self, fragment: OpenAiStreamFunctionCall, ids: &dyn CallIdGenerator) {
        let call = self.legacy.get_or_insert_with(PartialCall::default);

        if let Some(name) = fragment.name {
            call.name = Some(name);
            if call.id.is_none() {
                call.id = Some(ids.next_id());
            }
        }
        if let Some(arguments) = fragment.arguments {
            call.arguments.push_str(&arguments);
        }
    }

    fn push_indexed(&mut self, fragment: OpenAiStreamToolCall) {
        let call = self.indexed.entry(fragment.index).or_default();

        if let Some(id) = fragment.id {
            call.id = Some(id);
        }
        if let Some(function) = fragment.function {
            if let Some(name) = function.name {
                call.name = Some(name);
            }
            if let Some(arguments) = function.arguments {
                call.arguments.push_str(&arguments);
            }
        }
    }

    /// Complete every named call and reset the window
    fn flush(&mut self, ids: &dyn CallIdGenerator) -> Vec<FunctionCall> {
        let legacy = self.legacy.take();
        let indexed = std::mem::take(&mut self.indexed);

        legacy
            .into_iter()
            .chain(indexed.into_values())
            .filter_map(|call| call.complete(ids))
            .collect()
    }
}

/// Incremental state of one streaming exchange
///
/// Feed chunks with [`push`](Self::push) in arrival order and call
/// [`finish`](Self::finish) once the source is exhausted.
pub struct StreamReconstructor {
    ids: Arc<dyn CallIdGenerator>,
    window: CallWindow,
    calls_active: bool,
    choice_index: u32,
    response_id: Option<String>,
    model_version: Option<String>,
}

impl std::fmt::Debug for StreamReconstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamReconstructor")
            .field("window", &self.window)
            .field("calls_active", &self.calls_active)
            .field("choice_index", &self.choice_index)
            .finish_non_exhaustive()
    }
}

impl StreamReconstructor {
    /// Fresh state for one stream
    pub fn new(ids: Arc<dyn CallIdGenerator>) -> Self {
        Self {
            ids,
            window: CallWindow::default(),
            calls_active: false,
            choice_index: 0,
            response_id: None,
            model_version: None,
        }
    }

    /// Whether call fragments are waiting for their window to close
    pub const fn calls_active(&self) -> bool {
        self.calls_active
    }

    /// Apply one chunk, returning a response if it produced observable content
    pub fn push(&mut self, chunk: OpenAiStreamChunk) -> Option<GenerationResponse> {
        if chunk.id.is_some() {
            self.response_id = chunk.id;
        }
        if chunk.model.is_some() {
            self.model_version = chunk.model;
        }
        let usage = chunk.usage.map(UsageMetadata::from);

        let Some(choice) = chunk.choices.into_iter().next() else {
            if usage.is_none() {
                tracing::debug!("skipping stream chunk without choices");
                return None;
            }
            return Some(self.emit(Vec::new(), usage));
        };

        self.choice_index = choice.index;
        let delta = choice.delta;
        let has_call_fragment = delta.has_call_fragment();
        let mut parts = Vec::new();

        if let Some(text) = delta.content.filter(|text| !text.is_empty()) {
            parts.push(Part::Text(text));
        }

        if let Some(fragment) = delta.function_call {
            self.window.push_legacy(fragment, self.ids.as_ref());
            self.calls_active = true;
        }

        for fragment in delta.tool_calls.into_iter().flatten() {
            self.window.push_indexed(fragment);
            self.calls_active = true;
        }

        let call_finish = choice.finish_reason.as_deref().is_some_and(is_call_finish);
        if call_finish || (!has_call_fragment && self.calls_active) {
            parts.extend(self.window.flush(self.ids.as_ref()).into_iter().map(Part::FunctionCall));
            self.calls_active = false;
        }

        if parts.is_empty() {
            return usage.map(|usage| self.emit(Vec::new(), Some(usage)));
        }

        let finish_reason = choice.finish_reason.as_deref().map(map_finish_reason);
        Some(self.emit(vec![self.candidate(parts, finish_reason)], usage))
    }

    /// Flush calls left open by a stream that ended without a call finish
    pub fn finish(mut self) -> Option<GenerationResponse> {
        if !self.calls_active {
            return None;
        }

        let parts: Vec<Part> = self
            .window
            .flush(self.ids.as_ref())
            .into_iter()
            .map(Part::FunctionCall)
            .collect();
        self.calls_active = false;

        if parts.is_empty() {
            return None;
        }

        Some(self.emit(vec![self.candidate(parts, Some(FinishReason::Stop))], None))
    }

    fn candidate(&self, parts: Vec<Part>, finish_reason: Option<FinishReason>) -> Candidate {
        Candidate {
            content: Turn::model(parts),
            finish_reason,
            index: self.choice_index,
        }
    }

    fn emit(&self, candidates: Vec<Candidate>, usage: Option<UsageMetadata>) -> GenerationResponse {
        assemble(
            candidates,
            usage,
            self.response_id.clone(),
            self.model_version.clone(),
        )
    }
}

/// Lazily reconstruct responses from a chunk stream
///
/// Each call owns its own state, so independent streams never interact. A
/// source error is forwarded and ends the stream.
pub fn reconstruct_stream<S>(
    chunks: S,
    ids: Arc<dyn CallIdGenerator>,
) -> impl Stream<Item = Result<GenerationResponse, LlmError>> + Send
where
    S: Stream<Item = Result<OpenAiStreamChunk, LlmError>> + Send,
{
    async_stream::stream! {
        let mut reconstructor = StreamReconstructor::new(ids);
        let mut chunks = std::pin::pin!(chunks);

        while let Some(item) = chunks.next().await {
            match item {
                Ok(chunk) => {
                    if let Some(response) = reconstructor.push(chunk) {
                        yield Ok(response);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        if let Some(response) = reconstructor.finish() {
            yield Ok(response);
        }
    }
}
