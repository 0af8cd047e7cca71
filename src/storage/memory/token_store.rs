//! In-memory TokenStore implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ReadGate;
use crate::model::{now_rfc3339, ReviewToken};
use crate::storage::{Result, StorageError, TokenStore};

/// Token ledger that keeps rows in memory.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<String, ReviewToken>>,
    fail_on_insert: RwLock<bool>,
    fail_on_get: RwLock<bool>,
    fail_on_mark_used: RwLock<bool>,
    read_gate: ReadGate,
    consumed: AtomicUsize,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_insert(&self, fail: bool) {
        *self.fail_on_insert.write().await = fail;
    }

    pub async fn set_fail_on_get(&self, fail: bool) {
        *self.fail_on_get.write().await = fail;
    }

    pub async fn set_fail_on_mark_used(&self, fail: bool) {
        *self.fail_on_mark_used.write().await = fail;
    }

    /// Make the next `readers` lookups wait for each other after loading.
    pub async fn gate_reads(&self, readers: usize) {
        self.read_gate.arm(readers).await;
    }

    /// Number of `mark_used` calls that flipped a row to used.
    pub fn consumed_count(&self) -> usize {
        self.consumed.load(Ordering::SeqCst)
    }

    pub async fn stored_count(&self) -> usize {
        self.tokens.read().await.len()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn insert(&self, token: &ReviewToken) -> Result<()> {
        if *self.fail_on_insert.read().await {
            return Err(StorageError::Backend(
                "relation \"review_tokens\" does not exist".to_string(),
            ));
        }
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token) {
            return Err(StorageError::Backend(format!(
                "duplicate review token: {}",
                token.token
            )));
        }
        tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<ReviewToken>> {
        if *self.fail_on_get.read().await {
            return Err(StorageError::Backend("token lookup rejected".to_string()));
        }
        let row = self.tokens.read().await.get(token).cloned();

        self.read_gate.pass().await;
        Ok(row)
    }

    async fn mark_used(&self, token: &str) -> Result<bool> {
        if *self.fail_on_mark_used.read().await {
            return Err(StorageError::Backend("token update rejected".to_string()));
        }
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(token) {
            Some(row) if !row.used => {
                row.used = true;
                row.used_at = Some(now_rfc3339());
                self.consumed.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
