//! The runtime configuration record.
//!
//! A `Configuration` is what the encrypted store seals and what the agent
//! needs to reach the completion endpoint.  It is built once at startup and
//! passed explicitly to every component that needs it.
//!
//! # JSON shape
//!
//! ```json
//! {
//!     "api_key": "your-api-key-here",
//!     "api_url": "your-api-url-here",
//!     "model_name": "gpt-4o"
//! }
//! ```
//!
//! `api_key` and `api_url` are required and must be non-empty.  `model_name`
//! is optional; when absent (or blank) it falls back to [`DEFAULT_MODEL_NAME`].
//!
//! # Serde default values
//!
//! Parsing goes through a private `RawConfiguration` whose fields are all
//! optional.  This lets us report *which* field is missing instead of the
//! generic serde message, and apply the model default in one place.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model identifier used when the configuration does not name one.
pub const DEFAULT_MODEL_NAME: &str = "gpt-4o";

/// Error type for building or parsing a [`Configuration`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The input was not a JSON object of the expected shape.
    #[error("configuration is not valid JSON: {0}")]
    Parse(String),

    /// A required field was absent or empty.
    #[error("configuration field `{0}` is missing or empty")]
    MissingField(&'static str),
}

/// Decrypted runtime configuration.
///
/// Field order is fixed: it defines the canonical JSON encoding sealed by the
/// encrypted store.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    api_key: String,
    api_url: String,
    model_name: String,
}

#[derive(Deserialize)]
struct RawConfiguration {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    model_name: Option<String>,
}

impl Configuration {
    /// Builds a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if `api_key` or `api_url` is
    /// empty or whitespace only.
    pub fn new(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        model_name: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = required("api_key", Some(api_key.into()))?;
        let api_url = required("api_url", Some(api_url.into()))?;
        let model_name = model_name
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string());

        Ok(Self {
            api_key,
            api_url,
            model_name,
        })
    }

    /// Parses a configuration from UTF-8 JSON bytes.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Parse`] if the bytes are not a JSON object whose
    ///   fields are strings.
    /// - [`ConfigError::MissingField`] if a required field is absent or empty.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        let raw: RawConfiguration =
            serde_json::from_slice(bytes).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let api_key = required("api_key", raw.api_key)?;
        let api_url = required("api_url", raw.api_url)?;
        Self::new(api_key, api_url, raw.model_name)
    }

    /// Serializes the configuration to its canonical JSON bytes.
    pub fn to_json_vec(&self) -> Vec<u8> {
        // A struct of three `String`s cannot fail to serialize.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// The opaque credential sent as a bearer token.  Never log this value.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The completion endpoint base URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The model identifier sent with every request.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model_name", &self.model_name)
            .finish()
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingField(field)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
