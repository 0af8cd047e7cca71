//! Storage implementations.
//!
//! Two logical stores back the system: the singleton site document and the
//! review token ledger. Backends guarantee atomic single-row updates only;
//! nothing here spans a read and a later write.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::{StorageConfig, StorageType};

mod document_store;
pub mod memory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod schema;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;
mod token_store;

pub use document_store::{DocumentStore, WritePrecondition};
pub use memory::{MemoryDocumentStore, MemoryTokenStore};
pub use token_store::TokenStore;

#[cfg(feature = "postgres")]
pub use sql::postgres::{PostgresDocumentStore, PostgresTokenStore};
#[cfg(feature = "sqlite")]
pub use sql::sqlite::{SqliteDocumentStore, SqliteTokenStore};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Document not found: key={key}")]
    NotFound { key: String },

    #[error("Version conflict on {key}: expected {expected}, found {actual}")]
    VersionConflict {
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// True when a conditional write lost to a concurrent writer.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::VersionConflict { .. })
    }
}

/// Document store and token ledger pair handed to the services.
pub type Stores = (Arc<dyn DocumentStore>, Arc<dyn TokenStore>);

/// Initialize storage based on configuration.
///
/// SQL backends run their migrations before returning.
pub async fn init_storage(config: &StorageConfig) -> std::result::Result<Stores, Box<dyn std::error::Error>> {
    match config.storage_type {
        StorageType::Memory => {
            info!("Storage: memory");
            Ok((
                Arc::new(MemoryDocumentStore::new()),
                Arc::new(MemoryTokenStore::new()),
            ))
        }
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            let path = &config.sqlite.path;
            info!("Storage: sqlite at {}", path);

            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let pool = sqlx::SqlitePool::connect(&format!("sqlite:{}?mode=rwc", path)).await?;
            sqlx::migrate!("./migrations/sqlite").run(&pool).await?;

            Ok((
                Arc::new(SqliteDocumentStore::new(pool.clone())),
                Arc::new(SqliteTokenStore::new(pool)),
            ))
        }
        #[cfg(feature = "postgres")]
        StorageType::Postgres => {
            info!("Storage: postgres");

            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.postgres.max_connections)
                .connect(&config.postgres.uri)
                .await?;
            sqlx::migrate!("./migrations/postgres").run(&pool).await?;

            Ok((
                Arc::new(PostgresDocumentStore::new(pool.clone())),
                Arc::new(PostgresTokenStore::new(pool)),
            ))
        }
        #[allow(unreachable_patterns)]
        other => {
            error!("Storage type {:?} requested but its feature is not enabled", other);
            Err(format!("Storage type {:?} is not enabled in this build", other).into())
        }
    }
}
