#![allow(clippy::must_use_candidate)]

pub mod adapter;
mod env;
mod loader;
pub mod telemetry;

use serde::Deserialize;

pub use adapter::{AdapterConfig, DEFAULT_BASE_URL};
pub use telemetry::{LogConfig, LogFormat};

/// Top-level configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Chat-completions adapter
    pub adapter: AdapterConfig,
    /// Logging
    #[serde(default)]
    pub telemetry: LogConfig,
}
