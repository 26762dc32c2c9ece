//! Event classification
//!
//! Consumes CMS change notifications and decides which revalidation scopes
//! apply. Classification is pure decision logic over already-fetched
//! snapshots; it performs no caching and keeps no state between events.

use std::sync::Arc;

use rv_common::{ChangeEvent, DictionaryEntry, PublishedEntity};
use tracing::{debug, info};

use crate::config::RevalidateConfig;
use crate::resolver::ContentPathResolver;
use crate::service::RevalidateService;

/// Content types the front end renders as routable pages. Publishes of any
/// other type never trigger a content-path revalidation.
pub const ALLOWED_CONTENT_TYPES: [&str; 5] =
    ["content", "home", "contact", "articleList", "article"];

pub struct RevalidateEventHandler {
    config: Arc<RevalidateConfig>,
    service: Arc<RevalidateService>,
    resolver: Arc<dyn ContentPathResolver>,
}

impl RevalidateEventHandler {
    pub fn new(
        config: Arc<RevalidateConfig>,
        service: Arc<RevalidateService>,
        resolver: Arc<dyn ContentPathResolver>,
    ) -> Self {
        Self {
            config,
            service,
            resolver,
        }
    }

    pub async fn handle(&self, event: ChangeEvent) {
        match event {
            ChangeEvent::ContentPublished { entities } => {
                self.on_content_published(&entities).await
            }
            ChangeEvent::DictionaryItemsSaved { items } => {
                self.on_dictionary_items_saved(&items).await
            }
        }
    }

    pub async fn on_content_published(&self, entities: &[PublishedEntity]) {
        if !self.config.enabled {
            debug!("Revalidation disabled - skipping content published notification");
            return;
        }

        // One navigation update per batch, however many entities qualify.
        if entities
            .iter()
            .any(|e| matches!(e.level, 1 | 2) && !e.hidden_from_top_nav)
        {
            info!("Navigation revalidation triggered");
            self.service.for_navigation().await;
        }

        // Entities are processed independently: two entities resolving to
        // the same path both dispatch.
        for entity in entities {
            if !ALLOWED_CONTENT_TYPES.contains(&entity.content_type_alias.as_str()) {
                continue;
            }
            match self.resolver.resolve(entity.id).await {
                Some(path) => {
                    info!(content_id = entity.id, path = %path, "Content revalidation triggered");
                    self.service.for_content(path).await;
                }
                None => {
                    debug!(content_id = entity.id, "Entity has no resolvable path - skipping");
                }
            }
        }
    }

    pub async fn on_dictionary_items_saved(&self, items: &[DictionaryEntry]) {
        if !self.config.enabled {
            debug!("Revalidation disabled - skipping dictionary notification");
            return;
        }
        if items.is_empty() {
            return;
        }

        info!("Localisation revalidation triggered");
        self.service.for_localisation().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::WebhookDispatcher;
    use crate::resolver::StaticPathResolver;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rv_common::DispatchOutcome;

    struct RecordingDispatcher {
        bodies: Mutex<Vec<String>>,
    }

    impl RecordingDispatcher {
        fn new() -> Self {
            Self {
                bodies: Mutex::new(Vec::new()),
            }
        }

        fn bodies(&self) -> Vec<String> {
            self.bodies.lock().clone()
        }

        fn count_of(&self, body: &str) -> usize {
            self.bodies.lock().iter().filter(|b| *b == body).count()
        }
    }

    #[async_trait]
    impl WebhookDispatcher for RecordingDispatcher {
        async fn dispatch(&self, body: &[u8], _signature: &str) -> Vec<DispatchOutcome> {
            self.bodies
                .lock()
                .push(String::from_utf8(body.to_vec()).unwrap());
            vec![DispatchOutcome::delivered("http://recorded.example.com", 200)]
        }
    }

    const NAVIGATION: &str = r#"{"updateNavigation":true}"#;
    const LOCALISATION: &str = r#"{"updateLocalisation":true}"#;

    fn entity(id: i64, level: u32, alias: &str, hidden: bool) -> PublishedEntity {
        PublishedEntity {
            id,
            level,
            content_type_alias: alias.to_string(),
            hidden_from_top_nav: hidden,
        }
    }

    fn handler_with(
        enabled: bool,
        resolver: StaticPathResolver,
    ) -> (RevalidateEventHandler, Arc<RecordingDispatcher>) {
        let config = Arc::new(RevalidateConfig {
            enabled,
            webhook_urls: vec!["http://front.example.com/api/revalidate".to_string()],
            webhook_secret: "s3cr3t".to_string(),
        });
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let service = Arc::new(RevalidateService::new(config.clone(), dispatcher.clone()));
        (
            RevalidateEventHandler::new(config, service, Arc::new(resolver)),
            dispatcher,
        )
    }

    fn default_resolver() -> StaticPathResolver {
        let mut resolver = StaticPathResolver::new();
        resolver.insert(1, "/");
        resolver.insert(2, "/blog/");
        resolver.insert(3, "/blog/first-post/");
        resolver
    }

    #[tokio::test]
    async fn test_one_navigation_dispatch_for_many_qualifying_entities() {
        let (handler, dispatcher) = handler_with(true, StaticPathResolver::new());

        handler
            .on_content_published(&[
                entity(10, 1, "settings", false),
                entity(11, 2, "settings", false),
            ])
            .await;

        assert_eq!(dispatcher.count_of(NAVIGATION), 1);
    }

    #[tokio::test]
    async fn test_no_navigation_dispatch_when_no_entity_qualifies() {
        let (handler, dispatcher) = handler_with(true, StaticPathResolver::new());

        handler
            .on_content_published(&[
                entity(10, 3, "settings", false),
                entity(11, 1, "settings", true),
            ])
            .await;

        assert_eq!(dispatcher.count_of(NAVIGATION), 0);
    }

    #[tokio::test]
    async fn test_hidden_top_level_entity_does_not_trigger_navigation() {
        let (handler, dispatcher) = handler_with(true, StaticPathResolver::new());

        handler
            .on_content_published(&[entity(10, 2, "settings", true)])
            .await;

        assert!(dispatcher.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_content_dispatch_per_allowed_entity_with_resolved_path() {
        let (handler, dispatcher) = handler_with(true, default_resolver());

        handler
            .on_content_published(&[
                entity(2, 3, "articleList", false),
                entity(3, 4, "article", false),
            ])
            .await;

        assert_eq!(dispatcher.count_of(r#"{"contentPath":"/blog/"}"#), 1);
        assert_eq!(
            dispatcher.count_of(r#"{"contentPath":"/blog/first-post/"}"#),
            1
        );
    }

    #[tokio::test]
    async fn test_disallowed_content_type_is_skipped() {
        let (handler, dispatcher) = handler_with(true, default_resolver());

        handler
            .on_content_published(&[entity(3, 4, "siteSettings", false)])
            .await;

        assert!(dispatcher.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_entity_is_skipped_silently() {
        let (handler, dispatcher) = handler_with(true, StaticPathResolver::new());

        handler
            .on_content_published(&[entity(42, 4, "article", false)])
            .await;

        assert!(dispatcher.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_paths_are_not_deduplicated() {
        let mut resolver = StaticPathResolver::new();
        resolver.insert(7, "/shared/");
        resolver.insert(8, "/shared/");
        let (handler, dispatcher) = handler_with(true, resolver);

        handler
            .on_content_published(&[
                entity(7, 4, "article", false),
                entity(8, 4, "article", false),
            ])
            .await;

        assert_eq!(dispatcher.count_of(r#"{"contentPath":"/shared/"}"#), 2);
    }

    #[tokio::test]
    async fn test_navigation_and_content_are_independent() {
        let (handler, dispatcher) = handler_with(true, default_resolver());

        // Level-1 home page: qualifies for navigation and is in the
        // allow-list, so both scopes fire for the one entity.
        handler
            .on_content_published(&[entity(1, 1, "home", false)])
            .await;

        let bodies = dispatcher.bodies();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0], NAVIGATION);
        assert_eq!(bodies[1], r#"{"contentPath":"/"}"#);
    }

    #[tokio::test]
    async fn test_empty_publish_batch_dispatches_nothing() {
        let (handler, dispatcher) = handler_with(true, default_resolver());

        handler.on_content_published(&[]).await;

        assert!(dispatcher.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_non_empty_dictionary_batch_dispatches_one_localisation() {
        let (handler, dispatcher) = handler_with(true, StaticPathResolver::new());

        handler
            .on_dictionary_items_saved(&[
                DictionaryEntry {
                    key: "footer.copyright".to_string(),
                },
                DictionaryEntry {
                    key: "nav.home".to_string(),
                },
            ])
            .await;

        assert_eq!(dispatcher.count_of(LOCALISATION), 1);
    }

    #[tokio::test]
    async fn test_empty_dictionary_batch_dispatches_nothing() {
        let (handler, dispatcher) = handler_with(true, StaticPathResolver::new());

        handler.on_dictionary_items_saved(&[]).await;

        assert!(dispatcher.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_relay_ignores_all_events() {
        let (handler, dispatcher) = handler_with(false, default_resolver());

        handler
            .handle(ChangeEvent::ContentPublished {
                entities: vec![entity(1, 1, "home", false)],
            })
            .await;
        handler
            .handle(ChangeEvent::DictionaryItemsSaved {
                items: vec![DictionaryEntry {
                    key: "nav.home".to_string(),
                }],
            })
            .await;

        assert!(dispatcher.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_handle_routes_both_event_kinds() {
        let (handler, dispatcher) = handler_with(true, default_resolver());

        handler
            .handle(ChangeEvent::ContentPublished {
                entities: vec![entity(3, 4, "article", false)],
            })
            .await;
        handler
            .handle(ChangeEvent::DictionaryItemsSaved {
                items: vec![DictionaryEntry {
                    key: "nav.home".to_string(),
                }],
            })
            .await;

        assert_eq!(
            dispatcher.count_of(r#"{"contentPath":"/blog/first-post/"}"#),
            1
        );
        assert_eq!(dispatcher.count_of(LOCALISATION), 1);
    }
}
