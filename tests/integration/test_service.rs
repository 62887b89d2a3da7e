//! End-to-end tests for the grant service.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use granary::config::StorageBackendType;
use granary::{
    ClassifyError, Config, GrantDraft, GrantService, MemoryGrantStore, ModelProvider, Provenance,
    Taxonomy,
};

/// Provider that fails any prompt mentioning the marker text and answers
/// a fixed tag array otherwise, counting every attempt.
struct FlakyProvider {
    marker: String,
    reply: String,
    calls: AtomicUsize,
}

impl FlakyProvider {
    fn new(marker: &str, reply: &str) -> Arc<Self> {
        Arc::new(Self {
            marker: marker.to_string(),
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl ModelProvider for FlakyProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.contains(&self.marker) {
            return Err(ClassifyError::Transport("connection reset".into()));
        }
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "flaky-model"
    }
}

/// Write a small CamelCase taxonomy file and load it through the file
/// path, the way a deployment with a custom vocabulary would.
fn load_scenario_taxonomy(dir: &TempDir) -> Taxonomy {
    let path = dir.path().join("tags.toml");
    std::fs::write(
        &path,
        r#"
[[tags]]
name = "Irrigation"
synonyms = ["WaterManagement"]

[[tags]]
name = "WaterManagement"

[[tags]]
name = "SoilHealth"

[[tags]]
name = "Education"
"#,
    )
    .unwrap();
    Taxonomy::from_file(&path).unwrap()
}

fn service_with(taxonomy: Taxonomy) -> GrantService {
    GrantService::with_parts(
        Arc::new(taxonomy),
        None,
        Arc::new(MemoryGrantStore::new()),
        16 * 1024,
        4,
    )
}

fn draft(name: &str, description: &str) -> GrantDraft {
    GrantDraft {
        name: name.to_string(),
        description: description.to_string(),
    }
}

fn tag_set(tags: &[&str]) -> BTreeSet<String> {
    tags.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_file_taxonomy_keeps_canonical_casing() {
    let dir = TempDir::new().unwrap();
    let taxonomy = load_scenario_taxonomy(&dir);

    assert_eq!(taxonomy.canonicalize("irrigation"), Some("Irrigation"));
    assert_eq!(
        taxonomy.canonicalize("  WATERMANAGEMENT "),
        Some("WaterManagement")
    );
    assert_eq!(taxonomy.canonicalize("watering"), None);
}

#[tokio::test]
async fn test_heuristic_classifies_without_remote_endpoint() {
    let dir = TempDir::new().unwrap();
    let service = service_with(load_scenario_taxonomy(&dir));

    let result = service
        .classify("Orchard fund", "drip irrigation system for soil conservation")
        .await;

    // "irrigation" appears literally; "soil" alone is not SoilHealth.
    assert_eq!(result.tags, tag_set(&["Irrigation"]));
    assert_eq!(result.provenance, Provenance::Heuristic);
}

#[tokio::test]
async fn test_expansion_is_one_hop_and_idempotent() {
    let dir = TempDir::new().unwrap();
    let service = service_with(load_scenario_taxonomy(&dir));

    let selection = vec!["WaterManagement".to_string()];
    let effective = service.effective_tags(&selection, true);
    assert_eq!(effective, tag_set(&["Irrigation", "WaterManagement"]));

    // Expanding the expanded set is a fixed point.
    let again: Vec<String> = effective.iter().cloned().collect();
    assert_eq!(service.effective_tags(&again, true), effective);

    // Without the flag the selection is only canonicalized.
    assert_eq!(
        service.effective_tags(&selection, false),
        tag_set(&["WaterManagement"])
    );
}

#[tokio::test]
async fn test_filter_is_conjunctive_over_expanded_selection() {
    let dir = TempDir::new().unwrap();
    let service = service_with(load_scenario_taxonomy(&dir));

    service
        .ingest(vec![
            draft("Canal fund", "irrigation and education services"),
            draft("Pump fund", "irrigation upgrade only"),
        ])
        .await
        .unwrap();

    // Every selected tag must be carried by the grant.
    let both = vec!["irrigation".to_string(), "education".to_string()];
    let matched = service.list(&both, false).await.unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name, "Canal fund");

    // Expansion adds WaterManagement to the effective set, and the AND
    // semantics then require it on the grant as well. Neither grant
    // carries it, so nothing matches.
    let expanded = vec!["WaterManagement".to_string()];
    assert!(service.list(&expanded, true).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_tags_in_selection_are_ignored() {
    let service = service_with(Taxonomy::builtin());

    service
        .ingest(vec![draft("Herd fund", "dairy herd expansion")])
        .await
        .unwrap();

    // A stale tag in the selection drops out; the rest still filter.
    let selection = vec!["no-such-tag".to_string(), "dairy".to_string()];
    let matched = service.list(&selection, false).await.unwrap();
    assert_eq!(matched.len(), 1);

    // A selection of only unknown tags canonicalizes to the empty set,
    // which means no filter at all.
    let stale = vec!["bogus".to_string()];
    assert_eq!(service.list(&stale, true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_classifier_output_stays_inside_taxonomy() {
    let service = service_with(Taxonomy::builtin());
    let result = service
        .classify("Flood recovery", "disaster relief for flood damaged pastures")
        .await;

    assert_eq!(result.provenance, Provenance::Heuristic);
    assert!(result.tags.contains("flood"));
    assert!(result.tags.contains("disaster-relief"));
    for tag in &result.tags {
        assert!(service.taxonomy().contains(tag));
    }
}

#[tokio::test]
async fn test_remote_failure_degrades_only_that_item() {
    let dir = TempDir::new().unwrap();
    let provider = FlakyProvider::new("Middle plots", r#"["SoilHealth"]"#);
    let service = GrantService::with_parts(
        Arc::new(load_scenario_taxonomy(&dir)),
        Some(provider.clone()),
        Arc::new(MemoryGrantStore::new()),
        16 * 1024,
        4,
    );

    let report = service
        .ingest(vec![
            draft("North plots", "canal lining work"),
            draft("Middle plots", "drip irrigation upgrade"),
            draft("South plots", "classroom outreach"),
        ])
        .await
        .unwrap();

    // The failing item falls back to the heuristic; both neighbors keep
    // their model answers, and input order is preserved.
    assert!(report.failures.is_empty());
    assert_eq!(report.stored.len(), 3);

    assert_eq!(report.stored[0].grant.name, "North plots");
    assert_eq!(report.stored[0].provenance, Provenance::Model);
    assert_eq!(report.stored[0].grant.tags, tag_set(&["SoilHealth"]));

    assert_eq!(report.stored[1].grant.name, "Middle plots");
    assert_eq!(report.stored[1].provenance, Provenance::Heuristic);
    assert_eq!(report.stored[1].grant.tags, tag_set(&["Irrigation"]));

    assert_eq!(report.stored[2].grant.name, "South plots");
    assert_eq!(report.stored[2].provenance, Provenance::Model);
    assert_eq!(report.stored[2].grant.tags, tag_set(&["SoilHealth"]));

    // Every item still attempted the remote path once.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_jsonl_backend_persists_across_restarts() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.storage.backend = StorageBackendType::Jsonl;
    config.storage.data_dir = dir.path().to_string_lossy().to_string();

    {
        let service = GrantService::new(&config).unwrap();
        let report = service
            .ingest(vec![
                draft("First", "dairy herd expansion"),
                draft("   ", "no name"),
                draft("Third", "drip irrigation retrofit"),
            ])
            .await
            .unwrap();
        assert_eq!(report.stored.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
    }

    // A fresh service over the same directory replays the stored grants.
    let service = GrantService::new(&config).unwrap();
    assert_eq!(service.count().await.unwrap(), 2);

    let all = service.list(&[], false).await.unwrap();
    let names: Vec<&str> = all.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Third"]);
}
