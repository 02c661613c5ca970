use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Default chat-completions base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration of the chat-completions adapter
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    /// Provider label used in logs and error messages
    #[serde(default = "default_name")]
    pub name: String,
    /// Base URL; `/chat/completions` is appended
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Bearer token
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Model identifier sent with every request
    pub model: String,
    /// Request usage statistics at the end of streams
    #[serde(default)]
    pub include_stream_usage: bool,
    /// Whole-request timeout (e.g. "30s", "2m")
    #[serde(default)]
    pub timeout: Option<String>,
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: IndexMap<String, String>,
}

impl AdapterConfig {
    /// Parsed request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a valid duration
    pub fn request_timeout(&self) -> anyhow::Result<Option<Duration>> {
        self.timeout
            .as_deref()
            .map(|raw| duration_str::parse(raw).map_err(|e| anyhow::anyhow!("invalid timeout '{raw}': {e}")))
            .transpose()
    }
}

fn default_name() -> String {
    "openai".to_owned()
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("valid default URL")
}
