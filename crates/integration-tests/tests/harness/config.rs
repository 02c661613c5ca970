//! Programmatic adapter configuration for integration tests

use std::sync::Arc;

use chatbridge_config::AdapterConfig;
use chatbridge_llm::{OpenAiCompatProvider, SequentialCallIds};
use indexmap::IndexMap;
use secrecy::SecretString;
use url::Url;

/// Model name every test configures
pub const MODEL: &str = "mock-model-1";

/// Builder for adapter configurations pointed at a mock backend
pub struct ConfigBuilder {
    config: AdapterConfig,
}

impl ConfigBuilder {
    /// Minimal configuration for the given base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            config: AdapterConfig {
                name: "mock".to_owned(),
                base_url: Url::parse(base_url).unwrap(),
                api_key: None,
                model: MODEL.to_owned(),
                include_stream_usage: false,
                timeout: Some("5s".to_owned()),
                headers: IndexMap::new(),
            },
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.config.api_key = Some(SecretString::from(key.to_owned()));
        self
    }

    pub fn with_stream_usage(mut self) -> Self {
        self.config.include_stream_usage = true;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.config.headers.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn build(self) -> AdapterConfig {
        self.config
    }

    /// Provider with deterministic call ids (`call_test_1`, `call_test_2`, ...)
    pub fn provider(self) -> OpenAiCompatProvider {
        OpenAiCompatProvider::new(&self.config)
            .unwrap()
            .with_call_ids(Arc::new(SequentialCallIds::new("test")))
    }
}
