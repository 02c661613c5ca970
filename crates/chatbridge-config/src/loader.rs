use std::path::Path;

use http::header::{HeaderName, HeaderValue};

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the model is empty, the base URL is not HTTP(S),
    /// the timeout does not parse, or a header is invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        let adapter = &self.adapter;

        if adapter.model.trim().is_empty() {
            anyhow::bail!("adapter.model must not be empty");
        }

        if !matches!(adapter.base_url.scheme(), "http" | "https") {
            anyhow::bail!(
                "adapter.base_url must use http or https, got '{}'",
                adapter.base_url.scheme()
            );
        }

        adapter.request_timeout()?;

        for (name, value) in &adapter.headers {
            HeaderName::try_from(name.as_str()).map_err(|e| anyhow::anyhow!("invalid header name '{name}': {e}"))?;
            HeaderValue::try_from(value.as_str())
                .map_err(|e| anyhow::anyhow!("invalid value for header '{name}': {e}"))?;
        }

        Ok(())
    }
}
