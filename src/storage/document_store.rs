//! DocumentStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::model::{DocumentPatch, SiteDocument, VersionedDocument};

/// Condition a document write must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePrecondition {
    /// Write regardless of what is stored (last-writer-wins).
    Unconditional,
    /// Write only if the stored version still equals this one.
    Version(u64),
}

/// Interface for site document persistence.
///
/// The document is addressed by a fixed key and carries a version that every
/// successful write increments. Each call is atomic on its own; a `get`
/// followed by a `write` is not, which is what [`WritePrecondition::Version`]
/// exists to detect.
///
/// # Implementations
///
/// - `MemoryDocumentStore`: in-memory, with test hooks
/// - `SqliteDocumentStore`: SQLite storage
/// - `PostgresDocumentStore`: PostgreSQL storage
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the document and its current version.
    ///
    /// Returns `None` if the document has not been provisioned.
    async fn get(&self, key: &str) -> Result<Option<VersionedDocument>>;

    /// Replace the sections named by `patch`, leaving the others untouched.
    ///
    /// Fails with `VersionConflict` if the precondition does not hold and with
    /// `NotFound` if the document does not exist. Returns the new version.
    async fn write(
        &self,
        key: &str,
        patch: DocumentPatch,
        precondition: WritePrecondition,
    ) -> Result<u64>;

    /// Replace the whole document, creating it if absent. Returns the new version.
    async fn upsert(&self, key: &str, document: SiteDocument) -> Result<u64>;

    /// Create the document unless it already exists.
    ///
    /// Returns `true` if this call created it.
    async fn create_if_absent(&self, key: &str, document: SiteDocument) -> Result<bool>;
}
