//! Review token ledger configuration.

use serde::Deserialize;

/// Random bytes per token when not configured (64 hex characters).
pub const DEFAULT_TOKEN_BYTES: usize = 32;
/// Smallest accepted token size.
pub const MIN_TOKEN_BYTES: usize = 16;

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Random bytes drawn per token; the token is their hex encoding.
    pub token_bytes: usize,
}

impl LedgerConfig {
    /// Reject token sizes below [`MIN_TOKEN_BYTES`].
    pub fn check(&self) -> Result<(), String> {
        if self.token_bytes < MIN_TOKEN_BYTES {
            return Err(format!(
                "ledger.token_bytes must be at least {}, got {}",
                MIN_TOKEN_BYTES, self.token_bytes
            ));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            token_bytes: DEFAULT_TOKEN_BYTES,
        }
    }
}
