//! The grant service: taxonomy, classifier, expander and store wired
//! together from configuration.
//!
//! This is the layer the HTTP handlers and the CLI talk to. Ingestion
//! validates each payload before classification, classifies valid items
//! with bounded concurrency, and reports per-item failures instead of
//! aborting a batch. Listing and expansion delegate to the pure query
//! components.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classify::{
    ApiModelProvider, ClassificationResult, Classifier, ModelProvider, Provenance,
};
use crate::config::Config;
use crate::error::{Result, ValidationError};
use crate::metrics::get_metrics;
use crate::query::QueryExpander;
use crate::storage::{create_store, Grant, GrantStore, StoredGrant};
use crate::taxonomy::Taxonomy;

/// A grant payload as submitted for ingestion.
///
/// Missing fields deserialize as empty strings so that validation can
/// reject the item individually instead of failing the whole payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantDraft {
    /// Grant name.
    #[serde(rename = "grant_name", default)]
    pub name: String,
    /// Grant description.
    #[serde(rename = "grant_description", default)]
    pub description: String,
}

impl GrantDraft {
    /// Check the structural constraints: both fields non-empty after
    /// trimming. Runs before any classification is attempted.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(())
    }
}

/// A grant stored during ingestion, with the classification provenance.
/// Provenance is reported to the caller but never persisted.
#[derive(Debug, Clone)]
pub struct IngestedGrant {
    /// The stored record.
    pub grant: StoredGrant,
    /// Which classifier path assigned the tags.
    pub provenance: Provenance,
}

/// A rejected item of a batch ingestion.
#[derive(Debug, Clone)]
pub struct IngestFailure {
    /// Zero-based index of the item in the submitted batch.
    pub index: usize,
    /// Why the item was rejected.
    pub error: ValidationError,
}

/// Outcome of a batch ingestion: what was stored and what was rejected.
#[derive(Debug)]
pub struct IngestReport {
    /// Stored grants, in input order.
    pub stored: Vec<IngestedGrant>,
    /// Rejected items, in input order.
    pub failures: Vec<IngestFailure>,
}

enum ItemOutcome {
    Ready {
        name: String,
        description: String,
        result: ClassificationResult,
    },
    Invalid {
        index: usize,
        error: ValidationError,
    },
}

/// Orchestrates classification, expansion and storage for the API layer
/// and the CLI. Shared behind `Arc`; all state inside is either immutable
/// or synchronized by the store.
pub struct GrantService {
    taxonomy: Arc<Taxonomy>,
    classifier: Arc<Classifier>,
    expander: QueryExpander,
    store: Arc<dyn GrantStore>,
    ingest_width: usize,
}

impl GrantService {
    /// Wire a service from configuration.
    ///
    /// A configured-but-unusable remote model (for example a missing API
    /// key) downgrades to heuristic-only classification with a warning
    /// rather than failing startup.
    pub fn new(config: &Config) -> Result<Self> {
        let taxonomy = Arc::new(Taxonomy::load(&config.taxonomy)?);

        let provider: Option<Arc<dyn ModelProvider>> = if config.model.enabled() {
            match ApiModelProvider::from_config(&config.model) {
                Ok(provider) => {
                    info!(model = %config.model.model, "remote classification enabled");
                    Some(Arc::new(provider))
                }
                Err(e) => {
                    warn!(error = %e, "remote model unavailable, falling back to heuristic classification");
                    None
                }
            }
        } else {
            info!("no remote model endpoint configured, classification uses the heuristic");
            None
        };

        let classifier = Arc::new(Classifier::new(
            taxonomy.clone(),
            provider,
            config.model.max_prompt_bytes,
        ));
        let expander = QueryExpander::new(taxonomy.clone());
        let store = create_store(config)?;

        get_metrics().taxonomy_tags.set(taxonomy.len() as i64);

        Ok(Self {
            taxonomy,
            classifier,
            expander,
            store,
            ingest_width: config.ingest.max_concurrent_classifications,
        })
    }

    /// Assemble a service from explicit parts, bypassing configuration.
    pub fn with_parts(
        taxonomy: Arc<Taxonomy>,
        provider: Option<Arc<dyn ModelProvider>>,
        store: Arc<dyn GrantStore>,
        max_prompt_bytes: usize,
        ingest_width: usize,
    ) -> Self {
        let classifier = Arc::new(Classifier::new(
            taxonomy.clone(),
            provider,
            max_prompt_bytes,
        ));
        let expander = QueryExpander::new(taxonomy.clone());

        get_metrics().taxonomy_tags.set(taxonomy.len() as i64);

        Self {
            taxonomy,
            classifier,
            expander,
            store,
            ingest_width,
        }
    }

    /// The loaded taxonomy.
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Ingest a batch of grant payloads.
    ///
    /// Invalid items are rejected individually and never reach the
    /// classifier; valid items are classified with at most
    /// `ingest_width` classifications in flight, then stored in input
    /// order. One item's rejection never affects its siblings.
    pub async fn ingest(&self, drafts: Vec<GrantDraft>) -> Result<IngestReport> {
        let metrics = get_metrics();
        let width = self.ingest_width.max(1);

        let outcomes: Vec<ItemOutcome> = stream::iter(drafts.into_iter().enumerate().map(
            |(index, draft)| async move {
                if let Err(error) = draft.validate() {
                    return ItemOutcome::Invalid { index, error };
                }
                let name = draft.name.trim().to_string();
                let description = draft.description.trim().to_string();
                let result = self.classifier.classify(&name, &description).await;
                ItemOutcome::Ready {
                    name,
                    description,
                    result,
                }
            },
        ))
        .buffered(width)
        .collect()
        .await;

        let mut stored = Vec::new();
        let mut failures = Vec::new();

        for outcome in outcomes {
            match outcome {
                ItemOutcome::Invalid { index, error } => {
                    metrics.validation_failures_total.inc();
                    warn!(index, error = %error, "rejecting grant payload");
                    failures.push(IngestFailure { index, error });
                }
                ItemOutcome::Ready {
                    name,
                    description,
                    result,
                } => {
                    let record = self
                        .store
                        .insert(Grant {
                            name,
                            description,
                            tags: result.tags,
                        })
                        .await?;
                    metrics.grants_ingested_total.inc();
                    info!(
                        id = %record.id,
                        provenance = %result.provenance,
                        tags = record.tags.len(),
                        "stored grant"
                    );
                    stored.push(IngestedGrant {
                        grant: record,
                        provenance: result.provenance,
                    });
                }
            }
        }

        metrics.grants_count.set(self.store.count().await? as i64);

        Ok(IngestReport { stored, failures })
    }

    /// Classify text without storing anything.
    pub async fn classify(&self, name: &str, description: &str) -> ClassificationResult {
        self.classifier.classify(name, description).await
    }

    /// Compute the effective tag set for a raw selection.
    pub fn effective_tags(&self, explicit: &[String], include_synonyms: bool) -> BTreeSet<String> {
        self.expander.expand(explicit, include_synonyms)
    }

    /// List grants matching a raw selection. An empty selection (or one
    /// that canonicalizes to nothing) lists everything.
    pub async fn list(
        &self,
        explicit: &[String],
        include_synonyms: bool,
    ) -> Result<Vec<StoredGrant>> {
        let effective = self.effective_tags(explicit, include_synonyms);
        get_metrics().filter_queries_total.inc();
        self.store.list(&effective).await
    }

    /// Number of stored grants.
    pub async fn count(&self) -> Result<usize> {
        self.store.count().await
    }
}
