//! TokenStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::model::ReviewToken;

/// Interface for the review token ledger.
///
/// Rows are keyed by token string and are never deleted.
///
/// # Implementations
///
/// - `MemoryTokenStore`: in-memory, with test hooks
/// - `SqliteTokenStore`: SQLite storage
/// - `PostgresTokenStore`: PostgreSQL storage
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Insert a new ledger row. Fails if the token already exists.
    async fn insert(&self, token: &ReviewToken) -> Result<()>;

    /// Look up a row by exact token string.
    async fn get(&self, token: &str) -> Result<Option<ReviewToken>>;

    /// Flip `used` from `false` to `true` in a single conditional update.
    ///
    /// Returns `true` only for the call that performed the transition; an
    /// already-used or unknown token returns `false`.
    async fn mark_used(&self, token: &str) -> Result<bool>;
}
