use serde::{Deserialize, Serialize};

use super::content::{Part, Turn};

/// MIME type that marks a response-format constraint as JSON
pub const JSON_MIME_TYPE: &str = "application/json";

/// Vendor-neutral generation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Conversation turns, oldest first
    #[serde(default)]
    pub contents: Vec<Turn>,
    /// System instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    /// Sampling parameters
    #[serde(default)]
    pub generation_config: GenerationConfig,
    /// Tools the model may call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    /// Constraint on the shape of the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// System instruction as supplied by the caller
///
/// Callers send either a bare string or an object carrying `text` and/or
/// `parts`. The shape is fixed here, once, so translation never has to sniff
/// it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemInstruction {
    /// Bare string
    Text(String),
    /// Object with a `text` field or a list of parts
    Structured(StructuredInstruction),
}

/// Object form of a system instruction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredInstruction {
    /// Direct text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Parts, of which only the first text part is used
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Part>,
}

impl SystemInstruction {
    /// Text of the instruction
    ///
    /// Prefers the `text` field, then the first part's text, else empty.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Structured(structured) => structured
                .text
                .as_deref()
                .or_else(|| structured.parts.first().and_then(Part::as_text))
                .unwrap_or_default(),
        }
    }
}

impl From<&str> for SystemInstruction {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Turn> for SystemInstruction {
    fn from(turn: Turn) -> Self {
        Self::Structured(StructuredInstruction {
            text: None,
            parts: turn.parts,
        })
    }
}

/// Sampling parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

/// Group of function declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Declared functions
    #[serde(default)]
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// Declaration of a callable function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Function name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the parameters object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// Requested response format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseFormat {
    /// MIME type of the response
    pub mime_type: String,
    /// JSON Schema the response must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

impl ResponseFormat {
    /// JSON constraint with a schema
    pub fn json(schema: serde_json::Value) -> Self {
        Self {
            mime_type: JSON_MIME_TYPE.to_owned(),
            schema: Some(schema),
        }
    }

    /// Schema to enforce, if this is a JSON constraint with a schema
    pub fn json_schema(&self) -> Option<&serde_json::Value> {
        if self.mime_type == JSON_MIME_TYPE {
            self.schema.as_ref()
        } else {
            None
        }
    }
}

/// Embedding request; never sent over the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Contents to embed
    #[serde(default)]
    pub contents: Vec<Turn>,
}
