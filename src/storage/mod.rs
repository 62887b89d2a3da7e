//! Grant storage backends.
//!
//! Two backends implement [`GrantStore`]:
//! - [`MemoryGrantStore`]: volatile, for tests and ephemeral runs
//! - [`JsonlGrantStore`]: append-only file under the data directory

mod jsonl;
mod memory;
mod traits;

pub use jsonl::JsonlGrantStore;
pub use memory::MemoryGrantStore;
pub use traits::{Grant, GrantStore, StoredGrant};

use std::sync::Arc;

use crate::config::{Config, StorageBackendType};
use crate::error::Result;

/// Create a grant store from configuration.
pub fn create_store(config: &Config) -> Result<Arc<dyn GrantStore>> {
    match config.storage.backend {
        StorageBackendType::Memory => Ok(Arc::new(MemoryGrantStore::new())),
        StorageBackendType::Jsonl => {
            let data_dir = config.data_dir()?;
            Ok(Arc::new(JsonlGrantStore::open(&data_dir)?))
        }
    }
}
