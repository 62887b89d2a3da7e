//! The closed tag vocabulary and its synonym relation.
//!
//! A [`Taxonomy`] is loaded once at startup (builtin set or a TOML file),
//! is immutable afterwards, and is shared by handle (`Arc`) with the
//! classifier, the query expander and the API layer. Concurrent reads need
//! no synchronization.
//!
//! The synonym relation is flat and one-hop. It is stored in its declared
//! direction (each tag's alias strings, which is what the heuristic
//! classifier matches against) and additionally kept as a symmetric view
//! (what synonym-aware filter expansion uses): if A lists B, the symmetric
//! view reports A from B as well.
//!
//! Flatness is enforced at build time: any two synonyms of the same tag
//! must themselves be synonyms, so synonym groups are closed. This is what
//! makes one-hop expansion a fixed point instead of a graph walk.

mod builtin;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::TaxonomyConfig;
use crate::error::TaxonomyError;

/// Declarative taxonomy definition, as found in a taxonomy TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyDefinition {
    /// Canonical tags in registration order.
    pub tags: Vec<TagDefinition>,
}

/// One canonical tag with its declared synonyms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDefinition {
    /// Canonical display spelling.
    pub name: String,
    /// Declared synonyms; each must name another canonical tag.
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// The closed set of canonical tags plus the synonym relation.
#[derive(Debug)]
pub struct Taxonomy {
    /// Canonical display spellings in registration order.
    tags: Vec<String>,
    /// Lowercased spelling -> index into `tags`.
    by_lower: HashMap<String, usize>,
    /// Declared synonym lists (storage direction).
    declared: HashMap<String, BTreeSet<String>>,
    /// Symmetric closure of `declared`.
    symmetric: HashMap<String, BTreeSet<String>>,
}

impl Taxonomy {
    /// The taxonomy shipped with the service.
    pub fn builtin() -> Self {
        // The builtin definition is validated by unit tests; a failure here
        // would be a broken source tree, not a runtime condition.
        Self::from_definition(builtin::definition())
            .unwrap_or_else(|e| panic!("builtin taxonomy is invalid: {e}"))
    }

    /// Load per configuration: a taxonomy file when one is set, the
    /// builtin set otherwise.
    pub fn load(config: &TaxonomyConfig) -> Result<Self, TaxonomyError> {
        match &config.file {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    /// Load a taxonomy from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(TaxonomyError::ReadFile)?;
        let definition: TaxonomyDefinition = toml::from_str(&content)?;
        Self::from_definition(definition)
    }

    /// Build a taxonomy from a definition, enforcing its invariants:
    /// non-empty unique (case-insensitive) canonical names, synonym
    /// endpoints that are themselves canonical, no self-synonyms, and
    /// closed synonym groups.
    pub fn from_definition(definition: TaxonomyDefinition) -> Result<Self, TaxonomyError> {
        let mut tags: Vec<String> = Vec::with_capacity(definition.tags.len());
        let mut by_lower: HashMap<String, usize> = HashMap::with_capacity(definition.tags.len());

        for tag in &definition.tags {
            let name = tag.name.trim();
            if name.is_empty() {
                return Err(TaxonomyError::EmptyTag);
            }
            let lower = name.to_lowercase();
            if by_lower.contains_key(&lower) {
                return Err(TaxonomyError::DuplicateTag(name.to_string()));
            }
            by_lower.insert(lower, tags.len());
            tags.push(name.to_string());
        }

        let mut declared: HashMap<String, BTreeSet<String>> = HashMap::new();
        let mut symmetric: HashMap<String, BTreeSet<String>> = HashMap::new();

        for tag in &definition.tags {
            let name = tag.name.trim().to_string();
            for raw in &tag.synonyms {
                let lower = raw.trim().to_lowercase();
                let synonym = match by_lower.get(&lower) {
                    Some(&idx) => tags[idx].clone(),
                    None => {
                        return Err(TaxonomyError::UnknownSynonym {
                            tag: name,
                            synonym: raw.trim().to_string(),
                        })
                    }
                };
                if synonym == name {
                    return Err(TaxonomyError::SelfSynonym(name));
                }
                declared
                    .entry(name.clone())
                    .or_default()
                    .insert(synonym.clone());
                symmetric
                    .entry(name.clone())
                    .or_default()
                    .insert(synonym.clone());
                symmetric.entry(synonym).or_default().insert(name.clone());
            }
        }

        // Flatness check: the neighbors of every tag must be pairwise
        // related, otherwise expanding an expanded set could keep growing.
        for (tag, neighbors) in &symmetric {
            for left in neighbors {
                for right in neighbors {
                    if left >= right {
                        continue;
                    }
                    let related = symmetric
                        .get(left)
                        .is_some_and(|set| set.contains(right));
                    if !related {
                        return Err(TaxonomyError::OpenSynonymGroup {
                            tag: tag.clone(),
                            left: left.clone(),
                            right: right.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            tags,
            by_lower,
            declared,
            symmetric,
        })
    }

    /// Canonical tag names in registration order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Number of canonical tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the taxonomy is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, raw: &str) -> bool {
        self.canonicalize(raw).is_some()
    }

    /// Normalize an input to its canonical display spelling, or `None` for
    /// an unknown tag. Input is trimmed and matched case-insensitively.
    pub fn canonicalize(&self, raw: &str) -> Option<&str> {
        let lower = raw.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        self.by_lower.get(&lower).map(|&idx| self.tags[idx].as_str())
    }

    /// The symmetric synonym set of a canonical tag, empty if it has none.
    ///
    /// Fails with [`TaxonomyError::UnknownTag`] when the input is not the
    /// exact canonical spelling: callers must `canonicalize` first.
    pub fn synonyms_of(&self, tag: &str) -> Result<BTreeSet<String>, TaxonomyError> {
        if !self.is_canonical(tag) {
            return Err(TaxonomyError::UnknownTag(tag.to_string()));
        }
        Ok(self.symmetric.get(tag).cloned().unwrap_or_default())
    }

    /// The declared synonym list of a canonical tag (storage direction
    /// only, no symmetric completion). This is the alias-string set the
    /// heuristic classifier matches against.
    pub fn declared_synonyms_of(&self, canonical: &str) -> Option<&BTreeSet<String>> {
        self.declared.get(canonical)
    }

    /// Full symmetric synonym listing keyed by canonical tag, for the
    /// taxonomy listing endpoint. Tags without synonyms are omitted.
    pub fn synonym_listing(&self) -> BTreeMap<String, Vec<String>> {
        self.symmetric
            .iter()
            .map(|(tag, set)| (tag.clone(), set.iter().cloned().collect()))
            .collect()
    }

    fn is_canonical(&self, tag: &str) -> bool {
        self.by_lower
            .get(&tag.to_lowercase())
            .is_some_and(|&idx| self.tags[idx] == tag)
    }
}
