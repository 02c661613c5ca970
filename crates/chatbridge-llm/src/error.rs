use http::StatusCode;
use thiserror::Error;

/// Errors surfaced by the adapter
///
/// Malformed individual fragments never show up here: they are logged and
/// recovered where they occur.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The wire payload does not have the expected shape
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The remote could not be reached or answered with a non-2xx status
    #[error("{provider} API error: {message}")]
    Transport {
        /// Provider label from configuration
        provider: String,
        /// HTTP status, when a response was received
        status: Option<StatusCode>,
        /// Status and body text, or the client error
        message: String,
    },

    /// The event stream broke mid-way
    #[error("streaming error: {0}")]
    Streaming(String),

    /// Operation this adapter does not implement
    #[error("{operation} is not supported by this adapter")]
    Unsupported {
        /// Name of the rejected operation
        operation: &'static str,
    },

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LlmError {
    /// Transport failure with an HTTP status and the response body
    pub fn status(provider: &str, status: StatusCode, body: &str) -> Self {
        Self::Transport {
            provider: provider.to_owned(),
            status: Some(status),
            message: format!("{status}: {body}"),
        }
    }

    /// Whether a higher layer may retry the exchange
    ///
    /// The adapter itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { status: None, .. } | Self::Streaming(_) => true,
            Self::Transport {
                status: Some(status), ..
            } => status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS,
            Self::Protocol(_) | Self::Unsupported { .. } | Self::Internal(_) => false,
        }
    }
}
