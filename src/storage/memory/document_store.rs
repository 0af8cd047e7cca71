//! In-memory DocumentStore implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ReadGate;
use crate::model::{DocumentPatch, SiteDocument, VersionedDocument};
use crate::storage::{DocumentStore, Result, StorageError, WritePrecondition};

/// Document store that keeps documents in memory.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, VersionedDocument>>,
    fail_on_get: RwLock<bool>,
    fail_on_write: RwLock<bool>,
    read_gate: ReadGate,
    writes: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `document` at version 1 under `key`.
    pub fn with_document(key: &str, document: SiteDocument) -> Self {
        let mut documents = HashMap::new();
        documents.insert(
            key.to_string(),
            VersionedDocument {
                version: 1,
                document,
            },
        );
        Self {
            documents: RwLock::new(documents),
            ..Self::default()
        }
    }

    pub async fn set_fail_on_get(&self, fail: bool) {
        *self.fail_on_get.write().await = fail;
    }

    pub async fn set_fail_on_write(&self, fail: bool) {
        *self.fail_on_write.write().await = fail;
    }

    /// Make the next `readers` reads wait for each other after loading.
    ///
    /// All gated readers observe the same snapshot as long as no write lands
    /// before the last of them arrives.
    pub async fn gate_reads(&self, readers: usize) {
        self.read_gate.arm(readers).await;
    }

    /// Number of write attempts that reached the store, successful or not.
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn check_write(&self) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if *self.fail_on_write.read().await {
            return Err(StorageError::Backend("document write rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<VersionedDocument>> {
        if *self.fail_on_get.read().await {
            return Err(StorageError::Backend("document read rejected".to_string()));
        }
        let snapshot = self.documents.read().await.get(key).cloned();

        self.read_gate.pass().await;
        Ok(snapshot)
    }

    async fn write(
        &self,
        key: &str,
        patch: DocumentPatch,
        precondition: WritePrecondition,
    ) -> Result<u64> {
        self.check_write().await?;

        let mut documents = self.documents.write().await;
        let stored = documents.get_mut(key).ok_or_else(|| StorageError::NotFound {
            key: key.to_string(),
        })?;

        if let WritePrecondition::Version(expected) = precondition {
            if stored.version != expected {
                return Err(StorageError::VersionConflict {
                    key: key.to_string(),
                    expected,
                    actual: stored.version,
                });
            }
        }

        patch.apply_to(&mut stored.document);
        stored.version += 1;
        Ok(stored.version)
    }

    async fn upsert(&self, key: &str, document: SiteDocument) -> Result<u64> {
        self.check_write().await?;

        let mut documents = self.documents.write().await;
        let version = documents.get(key).map(|d| d.version + 1).unwrap_or(1);
        documents.insert(key.to_string(), VersionedDocument { version, document });
        Ok(version)
    }

    async fn create_if_absent(&self, key: &str, document: SiteDocument) -> Result<bool> {
        self.check_write().await?;

        let mut documents = self.documents.write().await;
        if documents.contains_key(key) {
            return Ok(false);
        }
        documents.insert(
            key.to_string(),
            VersionedDocument {
                version: 1,
                document,
            },
        );
        Ok(true)
    }
}
