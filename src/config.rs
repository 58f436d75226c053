//! Provider configuration.
//!
//! Explicit values win over the environment; empty strings count as unset.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::client::DEFAULT_BASE_URL;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// Environment variable consulted when `api_key` is not configured.
pub const API_KEY_ENV: &str = "FIREHYDRANT_API_KEY";

/// Environment variable consulted when `firehydrant_base_url` is not configured.
pub const BASE_URL_ENV: &str = "FIREHYDRANT_BASE_URL";

/// Schema of the provider block.
pub fn schema() -> Schema {
    Schema::v0()
        .with_attribute(
            "api_key",
            Attribute::optional_string()
                .with_description(format!("API key. Defaults to ${}.", API_KEY_ENV))
                .sensitive(),
        )
        .with_attribute(
            "firehydrant_base_url",
            Attribute::optional_string().with_description(format!(
                "API base URL. Defaults to ${}, then {}.",
                BASE_URL_ENV, DEFAULT_BASE_URL
            )),
        )
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    firehydrant_base_url: Option<String>,
}

/// Resolved provider settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Bearer token for every request.
    pub api_key: String,
    /// Base URL requests are resolved against.
    pub base_url: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve the provider block, falling back to the process environment.
    pub fn from_value(config: &Value) -> Result<Self, ProviderError> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve the provider block with `env` as the environment lookup.
    pub fn resolve(
        config: &Value,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ProviderError> {
        let raw = match config {
            Value::Null => RawConfig::default(),
            other => RawConfig::deserialize(other).map_err(|e| {
                ProviderError::Configuration(format!("invalid provider configuration: {}", e))
            })?,
        };

        let api_key = non_empty(raw.api_key)
            .or_else(|| non_empty(env(API_KEY_ENV)))
            .ok_or_else(|| {
                ProviderError::Configuration(format!(
                    "an API key is required: set `api_key` or ${}",
                    API_KEY_ENV
                ))
            })?;

        let base_url = non_empty(raw.firehydrant_base_url)
            .or_else(|| non_empty(env(BASE_URL_ENV)))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self { api_key, base_url })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
