//! RevalRelay Ingestion API
//!
//! HTTP endpoints through which an external CMS delivers change
//! notifications:
//! - Content published notifications
//! - Dictionary item saved notifications
//! - Health check
//!
//! Dispatch is awaited before the response is returned, so the CMS-side
//! publish operation completes only after every configured endpoint has
//! been attempted.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use rv_common::{ChangeEvent, DictionaryEntry, PublishedEntity};
use rv_revalidate::RevalidateEventHandler;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<RevalidateEventHandler>,
}

/// Content published notification from the CMS
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentPublishedRequest {
    /// Entities affected by the publish, with hierarchy and type metadata
    pub entities: Vec<PublishedEntityRequest>,
}

/// One published entity in a notification
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEntityRequest {
    /// CMS content identifier
    pub id: i64,
    /// Depth in the content tree; the root is level 1
    pub level: u32,
    /// Content type alias (e.g. "article")
    pub content_type_alias: String,
    /// Whether the page is excluded from the top navigation
    #[serde(default)]
    pub hidden_from_top_nav: bool,
}

impl From<PublishedEntityRequest> for PublishedEntity {
    fn from(e: PublishedEntityRequest) -> Self {
        Self {
            id: e.id,
            level: e.level,
            content_type_alias: e.content_type_alias,
            hidden_from_top_nav: e.hidden_from_top_nav,
        }
    }
}

/// Dictionary saved notification from the CMS
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DictionarySavedRequest {
    /// Saved dictionary items; only non-emptiness matters
    pub items: Vec<DictionaryEntryRequest>,
}

/// One saved dictionary item
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntryRequest {
    /// Dictionary item key
    pub key: String,
}

/// Acknowledgement returned once fanout has completed
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventAcceptedResponse {
    /// Correlation id assigned to this notification
    pub event_id: String,
    /// Number of entities/items in the notification batch
    pub batch_size: usize,
}

/// Simple health response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status: UP
    pub status: String,
    /// Application version
    pub version: String,
}

/// Ingestion API OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "RevalRelay Ingestion API",
        description = "Change-notification intake for front-end revalidation webhooks"
    ),
    paths(content_published, dictionary_saved, health),
    components(schemas(
        ContentPublishedRequest,
        PublishedEntityRequest,
        DictionarySavedRequest,
        DictionaryEntryRequest,
        EventAcceptedResponse,
        HealthResponse
    ))
)]
pub struct ApiDoc;

/// Create the ingestion router
pub fn create_router(handler: Arc<RevalidateEventHandler>) -> Router {
    let state = AppState { handler };

    Router::new()
        .route("/api/events/content-published", post(content_published))
        .route("/api/events/dictionary-saved", post(dictionary_saved))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

/// Receive a content published notification and fan out revalidation
/// webhooks for it.
#[utoipa::path(
    post,
    path = "/api/events/content-published",
    request_body = ContentPublishedRequest,
    responses(
        (status = 202, description = "Notification classified and dispatched", body = EventAcceptedResponse)
    )
)]
async fn content_published(
    State(state): State<AppState>,
    Json(request): Json<ContentPublishedRequest>,
) -> impl IntoResponse {
    let event_id = Uuid::new_v4();
    let batch_size = request.entities.len();
    info!(
        event_id = %event_id,
        entities = batch_size,
        "Content published notification received"
    );

    let entities = request.entities.into_iter().map(Into::into).collect();
    state
        .handler
        .handle(ChangeEvent::ContentPublished { entities })
        .await;

    (
        StatusCode::ACCEPTED,
        Json(EventAcceptedResponse {
            event_id: event_id.to_string(),
            batch_size,
        }),
    )
}

/// Receive a dictionary saved notification and fan out a localisation
/// webhook for it.
#[utoipa::path(
    post,
    path = "/api/events/dictionary-saved",
    request_body = DictionarySavedRequest,
    responses(
        (status = 202, description = "Notification classified and dispatched", body = EventAcceptedResponse)
    )
)]
async fn dictionary_saved(
    State(state): State<AppState>,
    Json(request): Json<DictionarySavedRequest>,
) -> impl IntoResponse {
    let event_id = Uuid::new_v4();
    let batch_size = request.items.len();
    info!(
        event_id = %event_id,
        items = batch_size,
        "Dictionary saved notification received"
    );

    let items = request
        .items
        .into_iter()
        .map(|i| DictionaryEntry { key: i.key })
        .collect();
    state
        .handler
        .handle(ChangeEvent::DictionaryItemsSaved { items })
        .await;

    (
        StatusCode::ACCEPTED,
        Json(EventAcceptedResponse {
            event_id: event_id.to_string(),
            batch_size,
        }),
    )
}

/// Basic health check.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "UP".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
