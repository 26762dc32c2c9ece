//! Revalidation service
//!
//! Thin assembly layer: builds the payload for a revalidation scope, signs
//! it, and hands it to the dispatcher. Owns the enabled gate - when the
//! relay is disabled no payload is serialized and no signature is computed.

use std::sync::Arc;

use rv_common::{DispatchOutcome, RevalidationPayload};
use tracing::{debug, error, info, warn};

use crate::config::RevalidateConfig;
use crate::dispatcher::WebhookDispatcher;
use crate::signer;

pub struct RevalidateService {
    config: Arc<RevalidateConfig>,
    dispatcher: Arc<dyn WebhookDispatcher>,
}

impl RevalidateService {
    pub fn new(config: Arc<RevalidateConfig>, dispatcher: Arc<dyn WebhookDispatcher>) -> Self {
        Self { config, dispatcher }
    }

    /// Signal a global navigation change.
    pub async fn for_navigation(&self) -> Vec<DispatchOutcome> {
        self.send(RevalidationPayload::Navigation).await
    }

    /// Signal a dictionary/translation change.
    pub async fn for_localisation(&self) -> Vec<DispatchOutcome> {
        self.send(RevalidationPayload::Localisation).await
    }

    /// Signal that a single page needs regeneration.
    pub async fn for_content(&self, path: impl Into<String>) -> Vec<DispatchOutcome> {
        self.send(RevalidationPayload::Content { path: path.into() })
            .await
    }

    async fn send(&self, payload: RevalidationPayload) -> Vec<DispatchOutcome> {
        let kind = payload.kind();

        if !self.config.enabled {
            debug!(kind = kind, "Revalidation disabled - skipping dispatch");
            return Vec::new();
        }

        let body = match serde_json::to_vec(&payload) {
            Ok(body) => body,
            Err(e) => {
                error!(kind = kind, error = %e, "Failed to serialize revalidation payload");
                return Vec::new();
            }
        };
        let signature = signer::sign(&body, &self.config.webhook_secret);

        let outcomes = self.dispatcher.dispatch(&body, &signature).await;

        if !outcomes.is_empty() {
            let failed = outcomes.iter().filter(|o| !o.success).count();
            if failed > 0 {
                warn!(
                    kind = kind,
                    delivered = outcomes.len() - failed,
                    failed = failed,
                    "Revalidation dispatch completed with failures"
                );
            } else {
                info!(
                    kind = kind,
                    delivered = outcomes.len(),
                    "Revalidation dispatch completed"
                );
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct RecordingDispatcher {
        calls: Mutex<Vec<(Vec<u8>, String)>>,
    }

    impl RecordingDispatcher {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(Vec<u8>, String)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl WebhookDispatcher for RecordingDispatcher {
        async fn dispatch(&self, body: &[u8], signature: &str) -> Vec<DispatchOutcome> {
            self.calls
                .lock()
                .push((body.to_vec(), signature.to_string()));
            vec![DispatchOutcome::delivered("http://recorded.example.com", 200)]
        }
    }

    fn service_with(enabled: bool) -> (RevalidateService, Arc<RecordingDispatcher>) {
        let config = Arc::new(RevalidateConfig {
            enabled,
            webhook_urls: vec!["http://front.example.com/api/revalidate".to_string()],
            webhook_secret: "s3cr3t".to_string(),
        });
        let dispatcher = Arc::new(RecordingDispatcher::new());
        (
            RevalidateService::new(config, dispatcher.clone()),
            dispatcher,
        )
    }

    #[tokio::test]
    async fn test_disabled_service_never_reaches_dispatcher() {
        let (service, dispatcher) = service_with(false);

        service.for_navigation().await;
        service.for_localisation().await;
        service.for_content("/blog/").await;

        assert!(dispatcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_navigation_body_and_signature() {
        let (service, dispatcher) = service_with(true);

        let outcomes = service.for_navigation().await;

        assert_eq!(outcomes.len(), 1);
        let calls = dispatcher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, br#"{"updateNavigation":true}"#.to_vec());
        assert_eq!(
            calls[0].1,
            "sha256=fff5cd96fa1673bdb5e95596c017d9743d86f2af527a2d8d5886d4c8f3822c41"
        );
    }

    #[tokio::test]
    async fn test_localisation_body() {
        let (service, dispatcher) = service_with(true);

        service.for_localisation().await;

        let calls = dispatcher.calls();
        assert_eq!(calls[0].0, br#"{"updateLocalisation":true}"#.to_vec());
        assert_eq!(calls[0].1, signer::sign(&calls[0].0, "s3cr3t"));
    }

    #[tokio::test]
    async fn test_content_body_carries_resolved_path() {
        let (service, dispatcher) = service_with(true);

        service.for_content("/blog/first-post/").await;

        let calls = dispatcher.calls();
        assert_eq!(calls[0].0, br#"{"contentPath":"/blog/first-post/"}"#.to_vec());
        assert_eq!(calls[0].1, signer::sign(&calls[0].0, "s3cr3t"));
    }

    #[tokio::test]
    async fn test_same_payload_dispatches_twice_without_deduplication() {
        let (service, dispatcher) = service_with(true);

        service.for_content("/about-us/").await;
        service.for_content("/about-us/").await;

        assert_eq!(dispatcher.calls().len(), 2);
    }
}
