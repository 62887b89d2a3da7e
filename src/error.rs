//! Error types for the granary service.

use thiserror::Error;

/// Main error type for granary operations.
#[derive(Error, Debug)]
pub enum GranaryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Taxonomy-related errors.
///
/// `UnknownTag` is a programming-contract violation: `synonyms_of` requires
/// canonical input, so callers must run `canonicalize` first. The remaining
/// variants are startup-time taxonomy definition problems.
#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("Unknown tag: {0} (not a canonical taxonomy tag)")]
    UnknownTag(String),

    #[error("Failed to read taxonomy file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse taxonomy file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate tag (case-insensitive): {0}")]
    DuplicateTag(String),

    #[error("Empty tag name in taxonomy definition")]
    EmptyTag,

    #[error("Synonym {synonym} of tag {tag} is not a canonical taxonomy tag")]
    UnknownSynonym { tag: String, synonym: String },

    #[error("Tag {0} lists itself as a synonym")]
    SelfSynonym(String),

    #[error(
        "Synonym group is not closed: {left} and {right} are both synonyms of {tag} \
         but not of each other"
    )]
    OpenSynonymGroup {
        tag: String,
        left: String,
        right: String,
    },
}

/// Grant payload validation errors, raised before classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("grant_name must be a non-empty string")]
    EmptyName,

    #[error("grant_description must be a non-empty string")]
    EmptyDescription,
}

/// Remote classification failures.
///
/// These never escape the classifier: every variant is recovered by
/// falling through to the heuristic path.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Remote model not configured: {0}")]
    NotConfigured(String),

    #[error("Model request timed out")]
    Timeout,

    #[error("Model request failed: {0}")]
    Transport(String),

    #[error("Model returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

/// Storage-related errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to open grant store: {0}")]
    Open(String),

    #[error("Failed to persist grant: {0}")]
    Write(String),

    #[error("Corrupt grant record: {0}")]
    CorruptRecord(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for granary operations.
pub type Result<T> = std::result::Result<T, GranaryError>;
