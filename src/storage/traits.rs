//! Storage trait and grant record types.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// A grant as assembled by ingestion, before storage assigns identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Grant name, non-empty after trimming.
    pub name: String,
    /// Grant description, non-empty after trimming.
    pub description: String,
    /// Canonical tags assigned by the classifier.
    pub tags: BTreeSet<String>,
}

/// A stored grant record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredGrant {
    /// Record ID.
    pub id: Uuid,
    /// Grant name.
    pub name: String,
    /// Grant description.
    pub description: String,
    /// Canonical tags assigned at ingestion.
    pub tags: BTreeSet<String>,
    /// Ingestion time.
    pub created_at: DateTime<Utc>,
}

impl StoredGrant {
    /// Wrap a grant with a fresh identity and timestamp.
    pub fn new(grant: Grant) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: grant.name,
            description: grant.description,
            tags: grant.tags,
            created_at: Utc::now(),
        }
    }
}

/// Trait for grant storage backends.
///
/// Listing applies the conjunctive tag predicate per grant; an empty
/// effective set returns everything. Stored grants are immutable: there
/// is no update or delete surface.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Persist one grant and return the stored record.
    async fn insert(&self, grant: Grant) -> Result<StoredGrant>;

    /// List grants matching an effective tag set, oldest first.
    async fn list(&self, effective: &BTreeSet<String>) -> Result<Vec<StoredGrant>>;

    /// Number of stored grants.
    async fn count(&self) -> Result<usize>;
}
