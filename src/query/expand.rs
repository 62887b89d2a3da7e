//! One-hop synonym expansion of explicit tag selections.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::taxonomy::Taxonomy;

/// Turns an explicit tag selection into the effective set used for
/// filtering.
pub struct QueryExpander {
    taxonomy: Arc<Taxonomy>,
}

impl QueryExpander {
    /// Create an expander over a taxonomy handle.
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Compute the effective tag set for a selection.
    ///
    /// Every selection is canonicalized first; unknown tags are dropped
    /// silently (a stale tag in a filter request is not an error). With
    /// `include_synonyms` off the result is just the canonicalized
    /// selection. With it on, each canonical tag contributes its symmetric
    /// synonym set, one hop only. Because synonym groups are closed,
    /// expanding an already-expanded set returns it unchanged.
    pub fn expand(&self, explicit: &[String], include_synonyms: bool) -> BTreeSet<String> {
        let canonical: BTreeSet<String> = explicit
            .iter()
            .filter_map(|raw| self.taxonomy.canonicalize(raw))
            .map(|tag| tag.to_string())
            .collect();

        if !include_synonyms {
            return canonical;
        }

        let mut effective = canonical.clone();
        for tag in &canonical {
            // Input is canonical here, so the lookup cannot fail.
            effective.extend(self.taxonomy.synonyms_of(tag).unwrap_or_default());
        }
        effective
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{TagDefinition, TaxonomyDefinition};

    fn scenario_expander() -> QueryExpander {
        let taxonomy = Taxonomy::from_definition(TaxonomyDefinition {
            tags: vec![
                TagDefinition {
                    name: "Irrigation".to_string(),
                    synonyms: vec!["WaterManagement".to_string()],
                },
                TagDefinition {
                    name: "WaterManagement".to_string(),
                    synonyms: vec![],
                },
                TagDefinition {
                    name: "SoilHealth".to_string(),
                    synonyms: vec![],
                },
            ],
        })
        .unwrap();
        QueryExpander::new(Arc::new(taxonomy))
    }

    fn selection(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|s| s.to_string()).collect()
    }

    fn expected(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expansion_is_symmetric() {
        let expander = scenario_expander();
        // WaterManagement never declared a synonym itself, but expansion
        // walks the relation both ways.
        let effective = expander.expand(&selection(&["WaterManagement"]), true);
        assert_eq!(effective, expected(&["Irrigation", "WaterManagement"]));
    }

    #[test]
    fn test_flag_off_only_canonicalizes() {
        let expander = scenario_expander();
        let effective = expander.expand(&selection(&["irrigation", "SOILHEALTH"]), false);
        assert_eq!(effective, expected(&["Irrigation", "SoilHealth"]));
    }

    #[test]
    fn test_unknown_tags_dropped_silently() {
        let expander = scenario_expander();
        let effective = expander.expand(&selection(&["Irrigation", "Blockchain"]), true);
        assert_eq!(effective, expected(&["Irrigation", "WaterManagement"]));

        assert!(expander.expand(&selection(&["Blockchain"]), true).is_empty());
    }

    #[test]
    fn test_empty_selection_stays_empty() {
        let expander = scenario_expander();
        assert!(expander.expand(&[], false).is_empty());
        assert!(expander.expand(&[], true).is_empty());
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let expander = scenario_expander();
        let once = expander.expand(&selection(&["WaterManagement", "SoilHealth"]), true);
        let once_vec: Vec<String> = once.iter().cloned().collect();
        let twice = expander.expand(&once_vec, true);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_idempotent_across_a_three_way_group() {
        // The builtin disaster group has three members; starting from any
        // one of them, a second expansion must add nothing.
        let expander = QueryExpander::new(Arc::new(Taxonomy::builtin()));
        let once = expander.expand(&selection(&["flood"]), true);
        assert_eq!(once, expected(&["disaster-relief", "drought", "flood"]));

        let once_vec: Vec<String> = once.iter().cloned().collect();
        assert_eq!(expander.expand(&once_vec, true), once);
    }
}
