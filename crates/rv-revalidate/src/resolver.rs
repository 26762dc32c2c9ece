//! Content path resolution
//!
//! The CMS owns the mapping from a content id to its public URL. The relay
//! only consumes it, behind a trait so hosts can plug in their content
//! cache.

use std::collections::HashMap;

use async_trait::async_trait;
use rv_common::{RelayError, Result};

/// External collaborator mapping a content identifier to its current public
/// URL path. `None` means the entity has no resolvable page.
#[async_trait]
pub trait ContentPathResolver: Send + Sync {
    async fn resolve(&self, content_id: i64) -> Option<String>;
}

/// Fixed id -> path table.
///
/// Standalone relay deployments load it from a JSON object keyed by content
/// id; it doubles as the resolver used in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPathResolver {
    paths: HashMap<i64, String>,
}

impl StaticPathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, content_id: i64, path: impl Into<String>) {
        self.paths.insert(content_id, path.into());
    }

    /// Parse a JSON object of id -> path, e.g. `{"1061":"/blog/"}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let paths: HashMap<i64, String> = serde_json::from_str(raw).map_err(|e| {
            RelayError::Config(format!(
                "Content path map is not a valid JSON object of id -> path: {}",
                e
            ))
        })?;
        Ok(Self { paths })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[async_trait]
impl ContentPathResolver for StaticPathResolver {
    async fn resolve(&self, content_id: i64) -> Option<String> {
        self.paths.get(&content_id).cloned()
    }
}
