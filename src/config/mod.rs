//! Configuration module.

mod settings;

pub use settings::{
    Config, IngestConfig, ModelConfig, ServerConfig, StorageBackendType, StorageConfig,
    TaxonomyConfig,
};
