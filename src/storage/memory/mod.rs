//! In-memory storage implementations.
//!
//! Used for the `memory` storage type and throughout the test suite. Both
//! stores expose hooks to inject backend failures and can hold concurrent
//! readers at a barrier so tests control interleavings.

use std::sync::Arc;

use tokio::sync::{Barrier, Mutex};

mod document_store;
mod token_store;

pub use document_store::MemoryDocumentStore;
pub use token_store::MemoryTokenStore;

/// Holds the next `remaining` reads at a shared barrier.
#[derive(Default)]
struct ReadGate {
    armed: Mutex<Option<(Arc<Barrier>, usize)>>,
}

impl ReadGate {
    async fn arm(&self, readers: usize) {
        *self.armed.lock().await = Some((Arc::new(Barrier::new(readers)), readers));
    }

    /// Wait at the barrier if this read is one of the gated ones.
    async fn pass(&self) {
        let barrier = {
            let mut armed = self.armed.lock().await;
            let barrier = match armed.as_mut() {
                Some((barrier, remaining)) if *remaining > 0 => {
                    *remaining -= 1;
                    Some(Arc::clone(barrier))
                }
                _ => None,
            };
            if matches!(armed.as_ref(), Some((_, 0))) {
                *armed = None;
            }
            barrier
        };

        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
    }
}
