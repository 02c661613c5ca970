//! Mock chat-completions backend for integration tests
//!
//! Serves one scripted reply on `/v1/chat/completions` and records what the
//! adapter sent

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum Reply {
    /// A complete JSON body
    Json(serde_json::Value),
    /// `data:` payloads framed as server-sent events, in order
    Events(Vec<String>),
    /// A non-2xx status with a plain-text body
    Error(StatusCode, String),
}

impl Reply {
    /// Stream of chunk objects terminated by `[DONE]`
    pub fn chunks(chunks: &[serde_json::Value]) -> Self {
        let mut events: Vec<String> = chunks.iter().map(ToString::to_string).collect();
        events.push("[DONE]".to_owned());
        Self::Events(events)
    }
}

/// Request as observed by the mock
#[derive(Debug, Clone)]
pub struct Recorded {
    pub body: serde_json::Value,
    pub headers: HeaderMap,
}

/// Mock backend
pub struct MockLlm {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockLlmState>,
}

struct MockLlmState {
    reply: Reply,
    requests: Mutex<Vec<Recorded>>,
}

impl MockLlm {
    /// Start the mock server, returning immediately
    pub async fn start(reply: Reply) -> anyhow::Result<Self> {
        let state = Arc::new(MockLlmState {
            reply,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the adapter
    ///
    /// Includes `/v1` since the adapter appends `/chat/completions`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of completion requests received
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Most recent request
    pub fn last_request(&self) -> Recorded {
        self.state
            .requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request received")
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_chat_completions(
    State(state): State<Arc<MockLlmState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.requests.lock().unwrap().push(Recorded { body, headers });

    match &state.reply {
        Reply::Json(value) => Json(value.clone()).into_response(),
        Reply::Events(events) => {
            let body: String = events.iter().map(|event| format!("data: {event}\n\n")).collect();
            ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
        }
        Reply::Error(status, message) => (*status, message.clone()).into_response(),
    }
}
