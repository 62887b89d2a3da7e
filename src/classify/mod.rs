//! Grant tag classification.
//!
//! The [`Classifier`] turns a grant's free text into a validated subset of
//! the taxonomy. When a remote model endpoint is configured, the prompt
//! path is tried first: exactly one call, bounded by the client timeout,
//! never retried. On any failure of that attempt (timeout, transport
//! fault, bad status, unparseable body) the deterministic keyword
//! heuristic answers instead; with no endpoint configured the heuristic is
//! the only path. Classification itself never fails and never returns a
//! tag outside the taxonomy.

mod heuristic;
mod remote;

pub use remote::{ApiModelProvider, ModelProvider, API_KEY_ENV};

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ClassifyError;
use crate::metrics::{get_metrics, Metrics};
use crate::taxonomy::Taxonomy;
use crate::utils::truncate_str;

/// Which path produced a classification. Reported for observability,
/// never stored with the grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// The remote model answered.
    Model,
    /// The local keyword heuristic answered.
    Heuristic,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Model => write!(f, "model"),
            Provenance::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Outcome of classifying one grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    /// Canonical tags, always a subset of the taxonomy. May be empty.
    pub tags: BTreeSet<String>,
    /// Which path produced the tags.
    pub provenance: Provenance,
}

/// Classifies grant text into taxonomy tags.
pub struct Classifier {
    taxonomy: Arc<Taxonomy>,
    provider: Option<Arc<dyn ModelProvider>>,
    max_prompt_bytes: usize,
}

impl Classifier {
    /// Create a classifier. With `provider` set to `None` every
    /// classification takes the heuristic path.
    pub fn new(
        taxonomy: Arc<Taxonomy>,
        provider: Option<Arc<dyn ModelProvider>>,
        max_prompt_bytes: usize,
    ) -> Self {
        Self {
            taxonomy,
            provider,
            max_prompt_bytes,
        }
    }

    /// Classify one grant.
    ///
    /// Infallible: remote failures are logged and counted, then recovered
    /// by the heuristic, which is pure and local.
    pub async fn classify(&self, name: &str, description: &str) -> ClassificationResult {
        let metrics = get_metrics();
        let _timer = Metrics::start_timer(&metrics.classify_duration_seconds);

        if let Some(provider) = &self.provider {
            match self.classify_remote(provider.as_ref(), name, description).await {
                Ok(tags) => {
                    metrics.classifications_model_total.inc();
                    return ClassificationResult {
                        tags,
                        provenance: Provenance::Model,
                    };
                }
                Err(e) => {
                    metrics.remote_failures_total.inc();
                    warn!(
                        model = provider.model_name(),
                        error = %e,
                        "remote classification failed, falling back to heuristic"
                    );
                }
            }
        }

        let tags = heuristic::heuristic_tags(&self.taxonomy, name, description);
        metrics.classifications_heuristic_total.inc();
        ClassificationResult {
            tags,
            provenance: Provenance::Heuristic,
        }
    }

    async fn classify_remote(
        &self,
        provider: &dyn ModelProvider,
        name: &str,
        description: &str,
    ) -> Result<BTreeSet<String>, ClassifyError> {
        let prompt = self.build_prompt(name, description);

        let metrics = get_metrics();
        let timer = Metrics::start_timer(&metrics.remote_call_duration_seconds);
        let body = provider.complete(&prompt).await?;
        debug!(
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "remote completion returned"
        );
        drop(timer);

        let candidates = parse_tag_array(&body)?;
        debug!(candidates = candidates.len(), "model returned tag candidates");

        // Unknown or duplicate candidates are dropped silently; an empty
        // set after filtering is still a model answer.
        Ok(candidates
            .iter()
            .filter_map(|raw| self.taxonomy.canonicalize(raw))
            .map(|tag| tag.to_string())
            .collect())
    }

    /// Build the classification prompt: the full canonical tag list plus
    /// the grant text. Only the description is truncated to the configured
    /// byte budget; the tag list always goes in whole.
    fn build_prompt(&self, name: &str, description: &str) -> String {
        let tag_list = self.taxonomy.tags().join(", ");
        let description = truncate_str(description, self.max_prompt_bytes);

        format!(
            "You are a grant tagging classifier.\n\
             Choose ALL relevant tags for the grant below from this list ONLY (no new tags):\n\
             {tag_list}\n\n\
             Return ONLY a JSON array of strings, e.g. [\"agriculture\", \"education\"]. \
             Do not include any additional text.\n\n\
             Grant name:\n{name}\n\n\
             Grant description:\n{description}"
        )
    }
}

/// Parse a model reply as a JSON array of strings. Tolerates a Markdown
/// code fence around the array; non-string elements are skipped.
fn parse_tag_array(text: &str) -> Result<Vec<String>, ClassifyError> {
    let payload = strip_code_fence(text);
    let values: Vec<serde_json::Value> = serde_json::from_str(payload).map_err(|e| {
        ClassifyError::MalformedResponse(format!("expected a JSON array of strings: {e}"))
    })?;

    Ok(values
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
