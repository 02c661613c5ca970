use serde::{Deserialize, Serialize};

use super::content::{FunctionCall, Turn};

/// Why a candidate stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Natural stop, including a stop to call tools
    Stop,
    /// Output token limit reached
    MaxTokens,
    /// Blocked by content filtering
    Safety,
    /// Anything the wire reported that has no mapping
    Other,
}

/// Token usage of one exchange
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt
    pub prompt_token_count: u32,
    /// Tokens in the generated candidates
    pub candidates_token_count: u32,
    /// Prompt plus candidates
    pub total_token_count: u32,
}

/// One generated candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated turn, always authored by the model
    pub content: Turn,
    /// Why generation stopped, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Position of this candidate
    pub index: u32,
}

/// Vendor-neutral generation response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    /// Generated candidates
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Token usage when the remote reported it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
    /// Every function call across the candidate parts, in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_calls: Option<Vec<FunctionCall>>,
    /// Remote response identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    /// Model that produced the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl GenerationResponse {
    /// Concatenated text of the first candidate
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .map(|candidate| candidate.content.text())
            .unwrap_or_default()
    }
}

/// Approximate token count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCount {
    /// Estimated tokens in the request
    pub total_tokens: u32,
}

/// Embedding response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedResponse {
    /// One vector per input
    pub embeddings: Vec<Vec<f32>>,
}
