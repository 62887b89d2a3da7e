//! Output formatting for CLI commands.
//!
//! This module handles formatting output as either JSON or human-readable text.

use std::collections::BTreeSet;

use granary::{ClassificationResult, Taxonomy};

/// Print a classification result.
pub fn print_classification(result: &ClassificationResult, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(result).unwrap());
    } else {
        if result.tags.is_empty() {
            println!("No tags matched.");
        } else {
            for tag in &result.tags {
                println!("{}", tag);
            }
        }
        println!("\nProvenance: {}", result.provenance);
    }
}

/// Print the canonical tag list with synonyms.
pub fn print_tags(taxonomy: &Taxonomy, json: bool) {
    if json {
        let listing = serde_json::json!({
            "tags": taxonomy.tags(),
            "synonyms": taxonomy.synonym_listing(),
        });
        println!("{}", serde_json::to_string_pretty(&listing).unwrap());
    } else {
        let synonyms = taxonomy.synonym_listing();
        for tag in taxonomy.tags() {
            match synonyms.get(tag) {
                Some(related) => println!("{}  ({})", tag, related.join(", ")),
                None => println!("{}", tag),
            }
        }
        println!("\nTotal: {} tags", taxonomy.len());
    }
}

/// Print the effective tag set for a selection.
pub fn print_effective_tags(explicit: &[String], effective: &BTreeSet<String>, json: bool) {
    if json {
        let listing = serde_json::json!({
            "selection": explicit,
            "effective": effective,
        });
        println!("{}", serde_json::to_string_pretty(&listing).unwrap());
    } else if effective.is_empty() {
        println!("Empty effective set: the filter matches every grant.");
    } else {
        for tag in effective {
            println!("{}", tag);
        }
        println!("\nTotal: {} tags", effective.len());
    }
}
