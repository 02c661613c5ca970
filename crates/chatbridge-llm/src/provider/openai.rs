//! OpenAI-compatible chat-completions backend

use std::sync::Arc;

use async_trait::async_trait;
use chatbridge_config::AdapterConfig;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{ContentGenerator, GenerationStream};
use crate::convert::{RequestTranslator, reconstruct, reconstruct_stream};
use crate::error::LlmError;
use crate::ids::{CallIdGenerator, RandomCallIds};
use crate::protocol::openai::{OpenAiRequest, OpenAiResponse};
use crate::sse::decode_chunks;
use crate::tokens::estimate_tokens;
use crate::types::{EmbedRequest, EmbedResponse, GenerationRequest, GenerationResponse, TokenCount};

/// Adapter speaking the chat-completions dialect
pub struct OpenAiCompatProvider {
    name: String,
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    translator: RequestTranslator,
    ids: Arc<dyn CallIdGenerator>,
}

impl OpenAiCompatProvider {
    /// Create from adapter configuration
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Internal` if a configured header or timeout is
    /// invalid, or the HTTP client cannot be built.
    pub fn new(config: &AdapterConfig) -> Result<Self, LlmError> {
        let mut builder = Client::builder().default_headers(extra_headers(config)?);
        if let Some(timeout) = config.request_timeout()? {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

        let ids: Arc<dyn CallIdGenerator> = Arc::new(RandomCallIds);

        Ok(Self {
            name: config.name.clone(),
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            translator: RequestTranslator::new(config.model.clone())
                .with_stream_usage(config.include_stream_usage)
                .with_call_ids(Arc::clone(&ids)),
            ids,
        })
    }

    /// Replace the call-id source for both directions
    #[must_use]
    pub fn with_call_ids(mut self, ids: Arc<dyn CallIdGenerator>) -> Self {
        self.translator = self.translator.with_call_ids(Arc::clone(&ids));
        self.ids = ids;
        self
    }

    /// Build the chat completions URL
    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    /// POST a wire request, mapping failures and non-2xx statuses
    async fn send(&self, wire_request: &OpenAiRequest) -> Result<reqwest::Response, LlmError> {
        tracing::debug!(
            provider = %self.name,
            model = %wire_request.model,
            messages = wire_request.messages.len(),
            stream = wire_request.stream,
            "sending chat completion request"
        );

        let mut builder = self.client.post(self.completions_url()).json(wire_request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(provider = %self.name, error = %e, "upstream request failed");
            LlmError::Transport {
                provider: self.name.clone(),
                status: None,
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = %self.name, status = %status, "upstream returned error");
            return Err(LlmError::status(&self.name, status, &body));
        }

        Ok(response)
    }
}

#[async_trait]
impl ContentGenerator for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let wire_request = self.translator.translate(request, false);
        let response = self.send(&wire_request).await?;

        let wire_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Protocol(format!("failed to decode response: {e}")))?;

        reconstruct(wire_response, self.ids.as_ref())
    }

    async fn generate_stream(&self, request: &GenerationRequest) -> Result<GenerationStream, LlmError> {
        let wire_request = self.translator.translate(request, true);
        let response = self.send(&wire_request).await?;

        if response.content_length() == Some(0) {
            return Err(LlmError::Transport {
                provider: self.name.clone(),
                status: Some(response.status()),
                message: "response body is empty, expected an event stream".to_owned(),
            });
        }

        let chunks = decode_chunks(response.bytes_stream());
        Ok(Box::pin(reconstruct_stream(chunks, Arc::clone(&self.ids))))
    }

    async fn count_tokens(&self, request: &GenerationRequest) -> Result<TokenCount, LlmError> {
        Ok(estimate_tokens(request))
    }

    async fn embed(&self, _request: &EmbedRequest) -> Result<EmbedResponse, LlmError> {
        Err(LlmError::Unsupported {
            operation: "embeddings",
        })
    }
}

/// Static headers from configuration
fn extra_headers(config: &AdapterConfig) -> Result<HeaderMap, LlmError> {
    let mut headers = HeaderMap::with_capacity(config.headers.len());

    for (name, value) in &config.headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| anyhow::anyhow!("invalid header name '{name}': {e}"))?;
        let value =
            HeaderValue::try_from(value.as_str()).map_err(|e| anyhow::anyhow!("invalid value for header '{name}': {e}"))?;
        headers.insert(name, value);
    }

    Ok(headers)
}
