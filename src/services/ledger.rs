//! Review token issuance, validation and consumption.
//!
//! The ledger is the authority on whether a caller may submit a testimonial.
//! `validate` is a fast-reject check that reserves nothing; `consume` is the
//! only gate, and it relies on the store's conditional `mark_used` so that
//! at most one caller ever consumes a given token.

use std::sync::Arc;

use rand::RngCore;
use tracing::{debug, info, warn};

use crate::config::{LedgerConfig, MIN_TOKEN_BYTES};
use crate::model::ReviewToken;
use crate::storage::{StorageError, TokenStore};

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Issuance failed; usually a missing or misconfigured ledger table.
    #[error("Failed to issue review token: {0}")]
    Write(#[source] StorageError),

    #[error("Review token is unknown or has already been used")]
    AlreadyUsed,

    #[error("Token ledger unavailable: {0}")]
    Storage(#[source] StorageError),
}

/// Generate a random token of `bytes` bytes, hex encoded.
///
/// Draws from the thread-local CSPRNG. The result is lowercase alphanumeric
/// and URL-safe, `2 * bytes` characters long.
pub fn generate_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes.max(MIN_TOKEN_BYTES)];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Token Ledger Manager.
pub struct TokenLedger {
    store: Arc<dyn TokenStore>,
    token_bytes: usize,
}

impl TokenLedger {
    pub fn new(store: Arc<dyn TokenStore>, config: &LedgerConfig) -> Self {
        Self {
            store,
            token_bytes: config.token_bytes.max(MIN_TOKEN_BYTES),
        }
    }

    /// Issue a new unused token.
    pub async fn issue(&self) -> Result<String> {
        let row = ReviewToken::issued(generate_token(self.token_bytes));
        if let Err(e) = self.store.insert(&row).await {
            warn!(error = %e, "Review token insert failed; check the ledger schema");
            return Err(LedgerError::Write(e));
        }

        info!("Review token issued");
        Ok(row.token)
    }

    /// True iff the token exists and is unused.
    ///
    /// Never fails: unknown tokens and lookup errors are both `false`.
    pub async fn validate(&self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }

        match self.store.get(token).await {
            Ok(Some(row)) => !row.used,
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Review token lookup failed, treating as invalid");
                false
            }
        }
    }

    /// Mark the token used.
    ///
    /// Exactly one of any number of concurrent calls on the same token
    /// succeeds; the rest get `AlreadyUsed`.
    pub async fn consume(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(LedgerError::AlreadyUsed);
        }

        let row = self.store.get(token).await.map_err(LedgerError::Storage)?;
        match row {
            Some(row) if !row.used => {}
            _ => return Err(LedgerError::AlreadyUsed),
        }

        if self.store.mark_used(token).await.map_err(LedgerError::Storage)? {
            info!("Review token consumed");
            Ok(())
        } else {
            debug!("Review token consumed concurrently by another request");
            Err(LedgerError::AlreadyUsed)
        }
    }
}
