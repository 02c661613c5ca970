//! Vendor-neutral generation types
//!
//! This is the shape callers speak. Everything on the wire side lives in
//! [`crate::protocol`] and is converted at the boundary by [`crate::convert`].

pub mod content;
pub mod request;
pub mod response;

pub use content::{FileData, FunctionCall, FunctionResponse, InlineData, Part, Role, Turn};
pub use request::{
    EmbedRequest, FunctionDeclaration, GenerationConfig, GenerationRequest, ResponseFormat, StructuredInstruction,
    SystemInstruction, Tool,
};
pub use response::{Candidate, EmbedResponse, FinishReason, GenerationResponse, TokenCount, UsageMetadata};
