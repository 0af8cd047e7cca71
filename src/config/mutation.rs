//! Document mutation configuration.

use std::time::Duration;

use serde::Deserialize;

/// How read-modify-write cycles on the site document handle concurrent writers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyMode {
    /// Write conditionally on the version read; re-run the cycle on conflict.
    #[default]
    CompareAndSwap,
    /// Write unconditionally. Interleaved cycles can lose updates.
    LastWriterWins,
}

/// Mutation configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    pub consistency: ConsistencyMode,
    /// Conflict retry policy. Unused under last-writer-wins.
    pub retry: RetryConfig,
}

/// Bounded exponential backoff for version conflicts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_attempts: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryConfig {
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms.max(self.min_delay_ms))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            min_delay_ms: 5,
            max_delay_ms: 250,
        }
    }
}
