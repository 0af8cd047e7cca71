//! Retry utilities: backoff builders for version conflicts.
//!
//! Uses `backon` for exponential backoff with jitter.

use backon::ExponentialBuilder;

use crate::config::RetryConfig;

/// Backoff for re-running a document read-modify-write after a version conflict.
///
/// `max_attempts` counts retries, not the first attempt. Jitter spreads out
/// writers that collided on the same version.
pub fn conflict_backoff(config: &RetryConfig) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(config.min_delay())
        .with_max_delay(config.max_delay())
        .with_max_times(config.max_attempts)
        .with_jitter()
}
