//! Append-only JSONL grant store.
//!
//! One JSON record per line in `grants.jsonl` under the data directory.
//! The collection is replayed into memory at open and the file is
//! appended on every insert, so listing never touches the disk.

use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{Result, StorageError};
use crate::query;

use super::{Grant, GrantStore, StoredGrant};

/// File-backed grant store.
pub struct JsonlGrantStore {
    path: PathBuf,
    grants: RwLock<Vec<StoredGrant>>,
}

impl JsonlGrantStore {
    /// Open a store under `data_dir`, replaying any existing records.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| StorageError::Open(format!("{}: {e}", data_dir.display())))?;
        let path = data_dir.join("grants.jsonl");

        let mut grants = Vec::new();
        if path.exists() {
            let file = std::fs::File::open(&path)
                .map_err(|e| StorageError::Open(format!("{}: {e}", path.display())))?;
            for (line_no, line) in BufReader::new(file).lines().enumerate() {
                let line = line.map_err(StorageError::Io)?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<StoredGrant>(&line) {
                    Ok(grant) => grants.push(grant),
                    Err(e) => {
                        // A bad line loses that record, not the store.
                        warn!(line = line_no + 1, error = %e, "skipping corrupt grant record");
                    }
                }
            }
            info!(count = grants.len(), path = %path.display(), "loaded grant store");
        }

        Ok(Self {
            path,
            grants: RwLock::new(grants),
        })
    }

    fn append(&self, stored: &StoredGrant) -> std::result::Result<(), StorageError> {
        let line = serde_json::to_string(stored)
            .map_err(|e| StorageError::CorruptRecord(e.to_string()))?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::Write(format!("{}: {e}", self.path.display())))?;
        writeln!(file, "{line}").map_err(|e| StorageError::Write(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl GrantStore for JsonlGrantStore {
    async fn insert(&self, grant: Grant) -> Result<StoredGrant> {
        let stored = StoredGrant::new(grant);
        // Hold the write lock across the append so file order matches
        // in-memory order.
        let mut grants = self.grants.write().await;
        self.append(&stored)?;
        grants.push(stored.clone());
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
