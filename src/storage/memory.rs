//! In-memory grant store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::query;

use super::{Grant, GrantStore, StoredGrant};

/// Volatile store backing tests and ephemeral deployments. Everything is
/// lost on process exit.
#[derive(Default)]
pub struct MemoryGrantStore {
    grants: RwLock<Vec<StoredGrant>>,
}

impl MemoryGrantStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GrantStore for MemoryGrantStore {
    async fn insert(&self, grant: Grant) -> Result<StoredGrant> {
        let stored = StoredGrant::new(grant);
        self.grants.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, effective: &BTreeSet<String>) -> Result<Vec<StoredGrant>> {
        let grants = self.grants.read().await;
        Ok(grants
            .iter()
            .filter(|grant| query::matches(&grant.tags, effective))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.grants.read().await.len())
    }
}
