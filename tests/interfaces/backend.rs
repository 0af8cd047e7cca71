//! Backend factory for interface tests.
//!
//! Provides a unified interface to create storage backends based on environment configuration.

use std::env;
use std::sync::Arc;

use quire::model::{SiteDocument, SITE_DOCUMENT_KEY};
use quire::storage::{DocumentStore, MemoryDocumentStore, MemoryTokenStore, TokenStore};

#[cfg(feature = "sqlite")]
use quire::storage::{SqliteDocumentStore, SqliteTokenStore};

#[cfg(feature = "postgres")]
use quire::storage::{PostgresDocumentStore, PostgresTokenStore};

#[cfg(feature = "postgres")]
use std::time::Duration;

#[cfg(feature = "postgres")]
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    GenericImage, ImageExt,
};

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sqlite,
    Postgres,
}

impl StorageBackend {
    pub fn from_env() -> Self {
        match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "sqlite".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackend::Memory,
            "postgres" => StorageBackend::Postgres,
            _ => StorageBackend::Sqlite,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Postgres => "postgres",
        }
    }
}

/// Container handles to keep containers alive during tests.
#[allow(dead_code)]
#[derive(Debug)]
pub enum ContainerHandle {
    None,
    #[cfg(feature = "postgres")]
    Postgres(testcontainers::ContainerAsync<GenericImage>),
}

/// Holds the storage implementations for a backend.
pub struct StorageContext {
    pub documents: Arc<dyn DocumentStore>,
    pub tokens: Arc<dyn TokenStore>,
    /// Container handle to keep container alive.
    #[allow(dead_code)]
    container: ContainerHandle,
}

impl std::fmt::Debug for StorageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageContext")
            .field("documents", &"<dyn DocumentStore>")
            .field("tokens", &"<dyn TokenStore>")
            .field("container", &self.container)
            .finish()
    }
}

impl StorageContext {
    /// Create a storage context for the configured backend with the site
    /// document provisioned.
    pub async fn new(backend: StorageBackend) -> Self {
        let context = match backend {
            StorageBackend::Memory => Self::create_memory(),
            StorageBackend::Sqlite => Self::create_sqlite().await,
            StorageBackend::Postgres => Self::create_postgres().await,
        };
        context
            .documents
            .create_if_absent(SITE_DOCUMENT_KEY, SiteDocument::default())
            .await
            .expect("Failed to provision site document");
        context
    }

    fn create_memory() -> Self {
        StorageContext {
            documents: Arc::new(MemoryDocumentStore::new()),
            tokens: Arc::new(MemoryTokenStore::new()),
            container: ContainerHandle::None,
        }
    }

    #[cfg(feature = "sqlite")]
    async fn create_sqlite() -> Self {
        use sqlx::sqlite::SqlitePoolOptions;

        // One connection: each connection to an in-memory database is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create SQLite pool");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        StorageContext {
            documents: Arc::new(SqliteDocumentStore::new(pool.clone())),
            tokens: Arc::new(SqliteTokenStore::new(pool)),
            container: ContainerHandle::None,
        }
    }

    #[cfg(not(feature = "sqlite"))]
    async fn create_sqlite() -> Self {
        panic!("SQLite feature not enabled. Build with --features sqlite");
    }

    #[cfg(feature = "postgres")]
    async fn create_postgres() -> Self {
        use sqlx::postgres::PgPoolOptions;

        let image = GenericImage::new("postgres", "16")
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stdout(
                "database system is ready to accept connections",
            ));

        let container = image
            .with_env_var("POSTGRES_USER", "testuser")
            .with_env_var("POSTGRES_PASSWORD", "testpass")
            .with_env_var("POSTGRES_DB", "testdb")
            .with_startup_timeout(Duration::from_secs(60))
            .start()
            .await
            .expect("Failed to start Postgres container");

        // Brief delay for full readiness
        tokio::time::sleep(Duration::from_secs(2)).await;

        let host_port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get port");

        let host = container.get_host().await.expect("Failed to get host");

        let connection_string =
            format!("postgres://testuser:testpass@{}:{}/testdb", host, host_port);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&connection_string)
            .await
            .expect("Failed to connect to PostgreSQL");

        sqlx::migrate!("./migrations/postgres")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        StorageContext {
            documents: Arc::new(PostgresDocumentStore::new(pool.clone())),
            tokens: Arc::new(PostgresTokenStore::new(pool)),
            container: ContainerHandle::Postgres(container),
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn create_postgres() -> Self {
        panic!("PostgreSQL feature not enabled. Build with --features postgres");
    }
}
