//! The grant matching predicate.

use std::collections::BTreeSet;

/// Whether a grant's tags satisfy an effective tag set.
///
/// An empty effective set means "no filter" and matches everything.
/// Otherwise matching is conjunctive: the grant must carry every tag in
/// the effective set, not merely one of them.
pub fn matches(grant_tags: &BTreeSet<String>, effective: &BTreeSet<String>) -> bool {
    effective.is_subset(grant_tags)
}
