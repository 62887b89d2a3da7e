//! Deterministic keyword fallback classifier.
//!
//! The availability floor of the system: pure, local, no network
//! dependency. A tag applies when its own name, or any synonym name the
//! tag declares, occurs in the grant text. Matching is case-insensitive
//! substring matching with hyphens treated as spaces, so the tag
//! `soil-health` matches text mentioning "soil health".

use std::collections::BTreeSet;

use crate::taxonomy::Taxonomy;

/// Classify grant text by keyword matching against the taxonomy.
///
/// Scans the concatenation of name and description in full; callers that
/// truncate text for other purposes must not truncate here.
pub(crate) fn heuristic_tags(
    taxonomy: &Taxonomy,
    name: &str,
    description: &str,
) -> BTreeSet<String> {
    let haystack = format!("{name} {description}").to_lowercase();
    let mut tags = BTreeSet::new();

    for tag in taxonomy.tags() {
        let declared_match = taxonomy
            .declared_synonyms_of(tag)
            .is_some_and(|synonyms| synonyms.iter().any(|s| text_mentions(&haystack, s)));

        if declared_match || text_mentions(&haystack, tag) {
            tags.insert(tag.clone());
        }
    }

    tags
}

/// Whether a tag string occurs in the (already lowercased) grant text.
/// The needle is the tag lowercased with hyphens replaced by spaces.
fn text_mentions(haystack: &str, tag: &str) -> bool {
    let needle = tag.replace('-', " ").to_lowercase();
    haystack.contains(&needle)
}
