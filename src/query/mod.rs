//! Filter query handling.
//!
//! A filter request arrives as a comma-separated tag list plus an
//! "include synonyms" flag. [`parse_tag_list`] splits the raw parameter,
//! [`QueryExpander`] turns the selection into the effective tag set, and
//! [`matches`] is the predicate storage backends apply per grant. All of
//! it is pure, synchronous computation.

mod expand;
mod filter;

pub use expand::QueryExpander;
pub use filter::matches;

/// Split a comma-separated tag-list parameter into raw selections.
///
/// Segments are trimmed and empty ones dropped; canonicalization and
/// unknown-tag filtering happen during expansion, not here.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
        .collect()
}
