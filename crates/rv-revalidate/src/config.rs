//! Relay configuration
//!
//! Loaded once at process start and immutable afterwards. The endpoint list
//! arrives as a JSON-encoded array of URL strings (the form the CMS stores
//! it in) and is parsed and validated here, so dispatch never re-parses
//! configuration and malformed input fails at load time.

use rv_common::{RelayError, Result};

#[derive(Debug, Clone)]
pub struct RevalidateConfig {
    /// Master switch. When false no signature is computed and no HTTP call
    /// is made, for any event.
    pub enabled: bool,
    /// Validated absolute http(s) endpoint URLs, in configuration order.
    pub webhook_urls: Vec<String>,
    /// HMAC key shared with the receiving endpoints. An empty string is
    /// valid input.
    pub webhook_secret: String,
}

impl RevalidateConfig {
    /// Inactive configuration: no endpoints, no secret, gate closed.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            webhook_urls: Vec::new(),
            webhook_secret: String::new(),
        }
    }

    /// Build from raw configuration values.
    ///
    /// `raw_urls` is the JSON-encoded URL array; absent or blank input is
    /// treated as an empty list. Malformed JSON or a non-absolute /
    /// non-http(s) entry fails with a diagnostic naming the offending value.
    pub fn from_parts(
        enabled: bool,
        raw_urls: Option<&str>,
        secret: impl Into<String>,
    ) -> Result<Self> {
        let webhook_urls = match raw_urls {
            Some(raw) if !raw.trim().is_empty() => parse_webhook_urls(raw)?,
            _ => Vec::new(),
        };

        Ok(Self {
            enabled,
            webhook_urls,
            webhook_secret: secret.into(),
        })
    }

    /// Load from environment variables:
    /// - `REVALRELAY_ENABLED` ("true"/"false", default false)
    /// - `REVALRELAY_WEBHOOK_URLS` (JSON array of URLs, optional)
    /// - `REVALRELAY_WEBHOOK_SECRET` (optional, default empty)
    pub fn from_env() -> Result<Self> {
        let enabled = std::env::var("REVALRELAY_ENABLED")
            .map(|v| v.parse().unwrap_or(false))
            .unwrap_or(false);

        let raw_urls = std::env::var("REVALRELAY_WEBHOOK_URLS").ok();

        let secret = std::env::var("REVALRELAY_WEBHOOK_SECRET").unwrap_or_default();

        Self::from_parts(enabled, raw_urls.as_deref(), secret)
    }
}

fn parse_webhook_urls(raw: &str) -> Result<Vec<String>> {
    let urls: Vec<String> = serde_json::from_str(raw).map_err(|e| {
        RelayError::Config(format!(
            "Webhook URL list is not a valid JSON array of strings: {}",
            e
        ))
    })?;

    for url in &urls {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| RelayError::Config(format!("Invalid webhook URL '{}': {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RelayError::Config(format!(
                "Webhook URL '{}' must use http or https",
                url
            )));
        }
    }

    Ok(urls)
}
