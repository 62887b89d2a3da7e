//! REST API request handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::classify::Provenance;
use crate::metrics::get_metrics;
use crate::query::parse_tag_list;
use crate::service::{GrantDraft, GrantService, IngestedGrant};
use crate::storage::StoredGrant;

/// Application state shared across handlers.
pub struct ApiState {
    /// Grant service for operations.
    pub service: Arc<GrantService>,
}

impl ApiState {
    /// Create new API state.
    pub fn new(service: Arc<GrantService>) -> Self {
        Self { service }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Ingestion payload: a single grant object or an array of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GrantsPayload {
    /// A single grant.
    One(GrantDraft),
    /// A batch of grants.
    Many(Vec<GrantDraft>),
}

impl GrantsPayload {
    fn into_drafts(self) -> Vec<GrantDraft> {
        match self {
            GrantsPayload::One(draft) => vec![draft],
            GrantsPayload::Many(drafts) => drafts,
        }
    }
}

/// A stored grant as rendered by the API.
#[derive(Debug, Clone, Serialize)]
pub struct GrantResponse {
    pub grant_name: String,
    pub grant_description: String,
    pub tags: Vec<String>,
}

impl From<StoredGrant> for GrantResponse {
    fn from(grant: StoredGrant) -> Self {
        Self {
            grant_name: grant.name,
            grant_description: grant.description,
            tags: grant.tags.into_iter().collect(),
        }
    }
}

/// A grant stored by an ingestion request. Provenance reports which
/// classifier path assigned the tags; it is not persisted.
#[derive(Debug, Clone, Serialize)]
pub struct IngestedGrantResponse {
    pub grant_name: String,
    pub grant_description: String,
    pub tags: Vec<String>,
    pub provenance: Provenance,
}

impl From<IngestedGrant> for IngestedGrantResponse {
    fn from(item: IngestedGrant) -> Self {
        Self {
            grant_name: item.grant.name,
            grant_description: item.grant.description,
            tags: item.grant.tags.into_iter().collect(),
            provenance: item.provenance,
        }
    }
}

/// A rejected item of an ingestion batch.
#[derive(Debug, Clone, Serialize)]
pub struct IngestFailureResponse {
    /// Zero-based index into the submitted batch.
    pub index: usize,
    pub error: String,
}

/// Ingestion response.
#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
    pub grants: Vec<IngestedGrantResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<IngestFailureResponse>,
}

/// Grants list response.
#[derive(Debug, Clone, Serialize)]
pub struct GrantsListResponse {
    pub grants: Vec<GrantResponse>,
    pub total: usize,
}

/// Taxonomy listing response.
#[derive(Debug, Clone, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
    pub synonyms: BTreeMap<String, Vec<String>>,
}

/// Expansion preview response.
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveTagsResponse {
    pub tags: Vec<String>,
}

/// Tag filter query parameters, shared by listing and expansion preview.
#[derive(Debug, Clone, Deserialize)]
pub struct TagFilterParams {
    /// Comma-separated tag list.
    #[serde(default)]
    pub tags: String,
    /// Include one-hop synonyms in the filter.
    #[serde(default)]
    pub synonyms: bool,
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ============================================================================
// Handler Functions
// ============================================================================

/// GET /api/health - Liveness probe.
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/tags - The canonical tag list and the synonym relation.
pub async fn tags_handler(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let taxonomy = state.service.taxonomy();
    Json(TagsResponse {
        tags: taxonomy.tags().to_vec(),
        synonyms: taxonomy.synonym_listing(),
    })
}

/// GET /api/tags/effective - Preview the expansion of a tag selection
/// without running the filter.
pub async fn effective_tags_handler(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<TagFilterParams>,
) -> impl IntoResponse {
    let selection = parse_tag_list(&params.tags);
    let effective = state.service.effective_tags(&selection, params.synonyms);
    Json(EffectiveTagsResponse {
        tags: effective.into_iter().collect(),
    })
}

/// POST /api/grants - Ingest a single grant or a batch.
///
/// Items are validated and classified independently; the response lists
/// stored grants and per-item failures side by side. The status is 201
/// when anything was stored, 400 when nothing was.
pub async fn ingest_handler(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<GrantsPayload>,
) -> impl IntoResponse {
    let drafts = payload.into_drafts();
    if drafts.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "no grants in payload".to_string(),
                code: "empty_payload".to_string(),
            }),
        )
            .into_response();
    }

    match state.service.ingest(drafts).await {
        Ok(report) => {
            let grants: Vec<IngestedGrantResponse> = report
                .stored
                .into_iter()
                .map(IngestedGrantResponse::from)
                .collect();
            let failures: Vec<IngestFailureResponse> = report
                .failures
                .into_iter()
                .map(|failure| IngestFailureResponse {
                    index: failure.index,
                    error: failure.error.to_string(),
                })
                .collect();

            let status = if grants.is_empty() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::CREATED
            };

            (status, Json(IngestResponse { grants, failures })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
                code: "ingest_failed".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /api/grants - List grants, optionally filtered by tags.
///
/// `?tags=a,b&synonyms=true` filters conjunctively over the expanded
/// selection; no tags means no filter.
pub async fn list_grants_handler(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<TagFilterParams>,
) -> impl IntoResponse {
    let selection = parse_tag_list(&params.tags);

    match state.service.list(&selection, params.synonyms).await {
        Ok(records) => {
            let grants: Vec<GrantResponse> =
                records.into_iter().map(GrantResponse::from).collect();
            let total = grants.len();

            (StatusCode::OK, Json(GrantsListResponse { grants, total })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
                code: "list_failed".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /metrics - Prometheus text exposition.
pub async fn metrics_handler() -> impl IntoResponse {
    get_metrics().export_prometheus()
}
