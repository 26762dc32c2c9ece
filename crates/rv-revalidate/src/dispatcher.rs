//! Webhook dispatcher
//!
//! Sends a signed payload to every configured endpoint, one POST each,
//! sequentially in configuration order. Endpoint outcomes are isolated: a
//! non-success status or a transport failure is recorded and logged, and the
//! remaining endpoints are still attempted. Nothing is retried and nothing
//! propagates to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use rv_common::DispatchOutcome;
use tracing::{debug, error, info};

use crate::signer::SIGNATURE_HEADER;

/// HTTP transport configuration for webhook delivery.
///
/// The triggering CMS operation blocks on fanout completion, so slow
/// endpoints directly add publish latency. Timeouts default to a few
/// seconds.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Delivery seam between the revalidation service and the network.
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    /// Attempt delivery of `body` (with its precomputed signature) to every
    /// endpoint, returning one outcome per endpoint attempted.
    async fn dispatch(&self, body: &[u8], signature: &str) -> Vec<DispatchOutcome>;
}

/// Production dispatcher backed by one pooled HTTP client.
///
/// The client lives as long as the dispatcher (process lifetime in the relay
/// binary) so connections are reused across dispatch calls.
pub struct HttpWebhookDispatcher {
    endpoints: Vec<String>,
    client: reqwest::Client,
}

impl HttpWebhookDispatcher {
    pub fn new(endpoints: Vec<String>, config: DispatcherConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { endpoints, client })
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    async fn send_one(&self, url: &str, body: &[u8], signature: &str) -> DispatchOutcome {
        let request = self
            .client
            .post(url)
            .header(SIGNATURE_HEADER, signature)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec());

        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if response.status().is_success() {
                    info!(url = %url, status = status, "Revalidation webhook delivered");
                    DispatchOutcome::delivered(url, status)
                } else {
                    error!(url = %url, status = status, "Revalidation webhook rejected by endpoint");
                    DispatchOutcome::rejected(url, status)
                }
            }
            Err(e) => {
                error!(url = %url, error = %e, "Revalidation webhook endpoint unreachable");
                DispatchOutcome::unreachable(url, e.to_string())
            }
        }
    }
}

#[async_trait]
impl WebhookDispatcher for HttpWebhookDispatcher {
    async fn dispatch(&self, body: &[u8], signature: &str) -> Vec<DispatchOutcome> {
        if self.endpoints.is_empty() {
            debug!("No webhook endpoints configured - nothing to dispatch");
            return Vec::new();
        }

        let mut outcomes = Vec::with_capacity(self.endpoints.len());
        for url in &self.endpoints {
            outcomes.push(self.send_one(url, body, signature).await);
        }
        outcomes
    }
}
