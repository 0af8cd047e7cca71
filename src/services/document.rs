//! Read-modify-write cycles on the singleton site document.
//!
//! Every mutation reads the document, derives a [`DocumentPatch`] from that
//! snapshot and writes the patch back. Reads and writes are separate store
//! calls, so the consistency mode decides what happens when another writer
//! lands in between:
//!
//! - `CompareAndSwap`: the write is conditional on the version read and the
//!   whole cycle is re-run on conflict, with bounded backoff.
//! - `LastWriterWins`: the write is unconditional and the later writer
//!   silently replaces the sections it touches.
//!
//! Patches only carry the sections an operation changes, so a view counter
//! write never replaces testimonials in either mode.

use std::sync::Arc;

use backon::Retryable;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::{ConsistencyMode, MutationConfig};
use crate::model::{
    AuditEntry, DocumentPatch, SiteConfig, SiteDocument, Testimonial, TestimonialSource,
    TestimonialStatus, VersionedDocument, SITE_DOCUMENT_KEY,
};
use crate::storage::{DocumentStore, StorageError, WritePrecondition};
use crate::utils::retry::conflict_backoff;

/// Audit action for a testimonial appended to the document.
pub const ACTION_TESTIMONIAL_SUBMIT: &str = "TESTIMONIAL_SUBMIT";
/// Audit action for a moderation decision.
pub const ACTION_TESTIMONIAL_STATUS_UPDATE: &str = "TESTIMONIAL_STATUS_UPDATE";
/// Audit action for a feature flag change.
pub const ACTION_CONFIG_UPDATE: &str = "CONFIG_UPDATE";
/// Audit action for an administrative whole-document replace.
pub const ACTION_DOCUMENT_REPLACE: &str = "DOCUMENT_REPLACE";

/// Actor recorded for reviewer submissions.
pub const PUBLIC_ACTOR: &str = "Public User";
/// Actor recorded for administrative changes.
pub const ADMIN_ACTOR: &str = "Admin";

/// Result type for document mutations.
pub type Result<T> = std::result::Result<T, MutationError>;

/// Errors that can occur while mutating the site document.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// The read failed or the document is not provisioned. Nothing was written.
    #[error("Failed to read site document: {0}")]
    Read(#[source] StorageError),

    #[error("Failed to write site document: {0}")]
    Write(#[source] StorageError),

    #[error("Site document still contended after {attempts} attempts")]
    Contention { attempts: usize },

    #[error("Testimonial not found: {id}")]
    TestimonialNotFound { id: String },
}

impl MutationError {
    /// True when a conditional write lost to a concurrent writer.
    pub fn is_conflict(&self) -> bool {
        matches!(self, MutationError::Write(e) if e.is_conflict())
    }
}

/// Document Mutator.
pub struct DocumentMutator {
    store: Arc<dyn DocumentStore>,
    config: MutationConfig,
}

impl DocumentMutator {
    pub fn new(store: Arc<dyn DocumentStore>, config: MutationConfig) -> Self {
        Self { store, config }
    }

    /// Current document.
    pub async fn read(&self) -> Result<SiteDocument> {
        Ok(self.load().await?.document)
    }

    /// Create the empty document unless it exists. Returns `true` if created.
    pub async fn ensure_provisioned(&self) -> Result<bool> {
        let created = self
            .store
            .create_if_absent(SITE_DOCUMENT_KEY, SiteDocument::default())
            .await
            .map_err(MutationError::Write)?;
        if created {
            info!(key = SITE_DOCUMENT_KEY, "Site document provisioned");
        }
        Ok(created)
    }

    /// Prepend `testimonial` and record the submission in the audit log.
    pub async fn append_testimonial(&self, testimonial: Testimonial) -> Result<()> {
        let actor = match testimonial.source {
            TestimonialSource::External => PUBLIC_ACTOR,
            TestimonialSource::Internal => ADMIN_ACTOR,
        };
        let details = format!("Testimonial {} submitted by {}", testimonial.id, testimonial.author);

        self.mutate("append_testimonial", |document| {
            let mut testimonials = Vec::with_capacity(document.testimonials.len() + 1);
            testimonials.push(testimonial.clone());
            testimonials.extend(document.testimonials.iter().cloned());

            let mut audit_logs = document.audit_logs.clone();
            audit_logs.record(AuditEntry::new(ACTION_TESTIMONIAL_SUBMIT, details.as_str(), actor));

            Ok(DocumentPatch::default()
                .with_testimonials(testimonials)
                .with_audit_logs(audit_logs))
        })
        .await?;

        info!(id = %testimonial.id, source = ?testimonial.source, "Testimonial appended");
        Ok(())
    }

    /// Count one view for today's UTC date.
    pub async fn increment_view_counter(&self) -> Result<()> {
        self.increment_view_counter_on(chrono::Utc::now().date_naive())
            .await
    }

    /// Count one view for `date`.
    pub async fn increment_view_counter_on(&self, date: NaiveDate) -> Result<()> {
        self.mutate("increment_view_counter", |document| {
            let mut stats = document.stats.clone();
            stats.record_view(date);
            Ok(DocumentPatch::default().with_stats(stats))
        })
        .await?;
        Ok(())
    }

    /// Set the moderation status of one testimonial.
    pub async fn set_testimonial_status(
        &self,
        id: &str,
        status: TestimonialStatus,
        actor: &str,
    ) -> Result<()> {
        self.mutate("set_testimonial_status", |document| {
            let mut testimonials = document.testimonials.clone();
            let testimonial = testimonials
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| MutationError::TestimonialNotFound { id: id.to_string() })?;
            testimonial.status = status;

            let mut audit_logs = document.audit_logs.clone();
            audit_logs.record(AuditEntry::new(
                ACTION_TESTIMONIAL_STATUS_UPDATE,
                format!("Testimonial {} marked {}", id, status),
                actor,
            ));

            Ok(DocumentPatch::default()
                .with_testimonials(testimonials)
                .with_audit_logs(audit_logs))
        })
        .await?;

        info!(id, %status, actor, "Testimonial status updated");
        Ok(())
    }

    /// Replace the feature flags.
    pub async fn update_config(&self, mut config: SiteConfig, actor: &str) -> Result<()> {
        config.drop_shadowed_flags();
        self.mutate("update_config", |document| {
            let mut audit_logs = document.audit_logs.clone();
            audit_logs.record(AuditEntry::new(
                ACTION_CONFIG_UPDATE,
                format!("showTypingAnimation={}", config.show_typing_animation),
                actor,
            ));
            Ok(DocumentPatch::default()
                .with_config(config.clone())
                .with_audit_logs(audit_logs))
        })
        .await?;
        Ok(())
    }

    /// Replace the whole document unconditionally.
    ///
    /// Always last-writer-wins, whatever the consistency mode: the payload is
    /// the caller's complete intended state and is not merged. The replace is
    /// recorded in the payload's own audit log.
    pub async fn upsert_document(&self, mut document: SiteDocument, actor: &str) -> Result<u64> {
        document.drop_shadowed_entries();
        document.audit_logs.record(AuditEntry::new(
            ACTION_DOCUMENT_REPLACE,
            format!("{} testimonials", document.testimonials.len()),
            actor,
        ));
        let version = self
            .store
            .upsert(SITE_DOCUMENT_KEY, document)
            .await
            .map_err(MutationError::Write)?;

        info!(version, actor, "Site document replaced");
        Ok(version)
    }

    async fn load(&self) -> Result<VersionedDocument> {
        self.store
            .get(SITE_DOCUMENT_KEY)
            .await
            .map_err(MutationError::Read)?
            .ok_or_else(|| {
                MutationError::Read(StorageError::NotFound {
                    key: SITE_DOCUMENT_KEY.to_string(),
                })
            })
    }

    /// Run one read-modify-write cycle under the configured consistency mode.
    async fn mutate<F>(&self, operation: &'static str, apply: F) -> Result<u64>
    where
        F: Fn(&SiteDocument) -> Result<DocumentPatch> + Send + Sync,
    {
        let mode = self.config.consistency;
        if mode == ConsistencyMode::LastWriterWins {
            return self.attempt(operation, &apply, mode).await;
        }

        let this = self;
        let apply = &apply;
        let result = (move || this.attempt(operation, apply, mode))
            .retry(conflict_backoff(&self.config.retry))
            .when(MutationError::is_conflict)
            .notify(|err: &MutationError, delay| {
                warn!(operation, error = %err, delay = ?delay, "Site document changed concurrently, retrying");
            })
            .await;

        match result {
            Err(e) if e.is_conflict() => {
                let attempts = self.config.retry.max_attempts + 1;
                warn!(operation, attempts, "Giving up on contended site document");
                Err(MutationError::Contention { attempts })
            }
            other => other,
        }
    }

    /// One read, one write. A read failure returns before anything is written.
    async fn attempt<F>(&self, operation: &'static str, apply: &F, mode: ConsistencyMode) -> Result<u64>
    where
        F: Fn(&SiteDocument) -> Result<DocumentPatch> + Send + Sync,
    {
        let current = self.load().await?;
        let patch = apply(&current.document)?;
        let precondition = match mode {
            ConsistencyMode::CompareAndSwap => WritePrecondition::Version(current.version),
            ConsistencyMode::LastWriterWins => WritePrecondition::Unconditional,
        };

        let version = self
            .store
            .write(SITE_DOCUMENT_KEY, patch, precondition)
            .await
            .map_err(MutationError::Write)?;

        debug!(operation, read = current.version, version, "Site document written");
        Ok(version)
    }
}
