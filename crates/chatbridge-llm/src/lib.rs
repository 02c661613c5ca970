//! Chat-completion protocol adapter
//!
//! Translates vendor-neutral generation requests into the OpenAI-style
//! chat-completions wire format and reconstructs vendor-neutral responses
//! from complete or streamed replies, reassembling tool calls whose names and
//! arguments arrive split across chunks.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod convert;
pub mod error;
pub mod ids;
pub mod protocol;
pub mod provider;
pub mod sse;
pub mod tokens;
pub mod types;

pub use convert::{RequestTranslator, StreamReconstructor, map_finish_reason, reconstruct, reconstruct_stream};
pub use error::LlmError;
pub use ids::{CallIdGenerator, RandomCallIds, SequentialCallIds};
pub use provider::openai::OpenAiCompatProvider;
pub use provider::{ContentGenerator, GenerationStream};
pub use tokens::estimate_tokens;
pub use types::{GenerationRequest, GenerationResponse};
