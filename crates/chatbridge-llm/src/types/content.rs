use serde::{Deserialize, Serialize};

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End user
    User,
    /// The model (`assistant` on the wire)
    #[serde(alias = "assistant")]
    Model,
    /// System instruction supplied inline as a turn
    System,
}

/// One role-tagged turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Author of the turn
    pub role: Role,
    /// Ordered parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Turn {
    /// Turn authored by the user with a single text part
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Turn authored by the model
    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }

    /// Concatenated text of all text parts, in order
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }

    /// All function-call parts, in order
    pub fn function_calls(&self) -> impl Iterator<Item = &FunctionCall> {
        self.parts.iter().filter_map(|part| match part {
            Part::FunctionCall(call) => Some(call),
            _ => None,
        })
    }
}

/// A single part within a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    /// Plain text
    Text(String),
    /// Call the model asked for
    FunctionCall(FunctionCall),
    /// Result of a previously requested call
    FunctionResponse(FunctionResponse),
    /// Reference to an uploaded file
    FileData(FileData),
    /// Inline binary payload (images, audio)
    InlineData(InlineData),
}

impl Part {
    /// Text of a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Function call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Call identifier linking the call to its response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name
    pub name: String,
    /// Arguments as a JSON object
    #[serde(default = "empty_object")]
    pub args: serde_json::Value,
}

/// Result of executing a function call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Identifier of the originating call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name
    pub name: String,
    /// Response payload
    #[serde(default = "empty_object")]
    pub response: serde_json::Value,
}

/// Reference to a file by URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    /// MIME type of the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Location of the file
    pub file_uri: String,
    /// Human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl FileData {
    /// Name shown when the file cannot be forwarded
    pub fn file_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or_else(|| {
            self.file_uri
                .rsplit('/')
                .find(|segment| !segment.is_empty())
                .unwrap_or(&self.file_uri)
        })
    }
}

/// Base64 payload carried inline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type (e.g. "image/png")
    pub mime_type: String,
    /// Base64-encoded data
    pub data: String,
}

pub(crate) fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
