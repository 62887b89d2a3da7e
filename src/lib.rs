//! Granary: Grant Tagging and Filtering Service
//!
//! A Rust service that classifies grant descriptions against a closed
//! tag taxonomy and serves synonym-aware tag filtering over the stored
//! grants. Classification calls a remote model when one is configured
//! and falls back to a deterministic keyword heuristic otherwise.

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod metrics;
pub mod query;
pub mod service;
pub mod storage;
pub mod taxonomy;
pub mod utils;

pub use api::{create_rest_router, ApiState, RestApiConfig};
pub use classify::{ApiModelProvider, ClassificationResult, Classifier, ModelProvider, Provenance};
pub use config::Config;
pub use error::{ClassifyError, GranaryError, Result, TaxonomyError, ValidationError};
pub use metrics::{get_metrics, Metrics};
pub use query::{matches, parse_tag_list, QueryExpander};
pub use service::{GrantDraft, GrantService, IngestFailure, IngestReport, IngestedGrant};
pub use storage::{create_store, Grant, GrantStore, JsonlGrantStore, MemoryGrantStore, StoredGrant};
pub use taxonomy::{TagDefinition, Taxonomy, TaxonomyDefinition};
