use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Change Events
// ============================================================================

/// A mutation notification received from the CMS.
///
/// Exactly two kinds of change are relevant to front-end revalidation:
/// a batch of published content entities, or a batch of saved dictionary
/// (translation) items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeEvent {
    ContentPublished { entities: Vec<PublishedEntity> },
    DictionaryItemsSaved { items: Vec<DictionaryEntry> },
}

/// Snapshot of a content entity at publish time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEntity {
    pub id: i64,
    /// Depth in the content tree; the root is level 1.
    pub level: u32,
    pub content_type_alias: String,
    #[serde(default)]
    pub hidden_from_top_nav: bool,
}

/// A saved dictionary item. Only its presence in a batch matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub key: String,
}

// ============================================================================
// Revalidation Payloads
// ============================================================================

/// The message pushed to front-end webhook endpoints.
///
/// Serializes to an object with exactly one key so the wire form is stable
/// for a given logical payload and signatures stay reproducible:
/// `{"updateNavigation":true}`, `{"updateLocalisation":true}` or
/// `{"contentPath":"<path>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevalidationPayload {
    Navigation,
    Localisation,
    Content { path: String },
}

impl RevalidationPayload {
    /// Scope label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            RevalidationPayload::Navigation => "navigation",
            RevalidationPayload::Localisation => "localisation",
            RevalidationPayload::Content { .. } => "content-path",
        }
    }
}

impl Serialize for RevalidationPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            RevalidationPayload::Navigation => map.serialize_entry("updateNavigation", &true)?,
            RevalidationPayload::Localisation => map.serialize_entry("updateLocalisation", &true)?,
            RevalidationPayload::Content { path } => map.serialize_entry("contentPath", path)?,
        }
        map.end()
    }
}

// ============================================================================
// Dispatch Outcomes
// ============================================================================

/// Result of one webhook delivery attempt to one endpoint.
///
/// Collected per endpoint within a dispatch call so that a failing endpoint
/// never hides the outcomes of its siblings. Used for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub url: String,
    pub success: bool,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn delivered(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            success: true,
            status_code: Some(status_code),
            error: None,
        }
    }

    /// The endpoint answered with a non-success status.
    pub fn rejected(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            success: false,
            status_code: Some(status_code),
            error: Some(format!("HTTP {}", status_code)),
        }
    }

    /// The request never produced an HTTP response (connect error, timeout,
    /// DNS failure).
    pub fn unreachable(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            status_code: None,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
