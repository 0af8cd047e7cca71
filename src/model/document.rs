//! The singleton site document and partial updates to it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AuditLog, Testimonial, ViewStats};

/// Fixed key addressing the one site document.
pub const SITE_DOCUMENT_KEY: &str = "main";

/// Public feature flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    pub show_typing_animation: bool,
    /// Flags this crate does not interpret. A `showTypingAnimation` entry is
    /// dropped before the config is stored.
    #[serde(flatten)]
    pub flags: Map<String, Value>,
}

impl SiteConfig {
    pub(crate) fn drop_shadowed_flags(&mut self) {
        super::drop_owned_keys(&mut self.flags, &["showTypingAnimation"]);
    }
}

const MANAGED_SECTIONS: &[&str] = &["testimonials", "auditLogs", "stats", "config"];

/// The whole site payload.
///
/// Top-level fields other than the four managed sections (course catalog,
/// page copy, ...) are kept verbatim in `content` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteDocument {
    /// Newest first.
    pub testimonials: Vec<Testimonial>,
    pub audit_logs: AuditLog,
    pub stats: ViewStats,
    pub config: SiteConfig,
    /// Entries named like a managed section are dropped before a replace.
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl SiteDocument {
    pub fn testimonial(&self, id: &str) -> Option<&Testimonial> {
        self.testimonials.iter().find(|t| t.id == id)
    }

    /// Drop flattened entries that collide with a typed field, at every level.
    pub(crate) fn drop_shadowed_entries(&mut self) {
        super::drop_owned_keys(&mut self.content, MANAGED_SECTIONS);
        self.config.drop_shadowed_flags();
        for testimonial in &mut self.testimonials {
            testimonial.drop_shadowed_extras();
        }
    }
}

/// A document together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedDocument {
    pub version: u64,
    pub document: SiteDocument,
}

/// Top-level sections to replace in one atomic write.
///
/// Sections left as `None` keep whatever the store currently holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    pub testimonials: Option<Vec<Testimonial>>,
    pub audit_logs: Option<AuditLog>,
    pub stats: Option<ViewStats>,
    pub config: Option<SiteConfig>,
    pub content: Option<Map<String, Value>>,
}

impl DocumentPatch {
    pub fn with_testimonials(mut self, testimonials: Vec<Testimonial>) -> Self {
        self.testimonials = Some(testimonials);
        self
    }

    pub fn with_audit_logs(mut self, audit_logs: AuditLog) -> Self {
        self.audit_logs = Some(audit_logs);
        self
    }

    pub fn with_stats(mut self, stats: ViewStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_config(mut self, config: SiteConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Apply the present sections onto `document`.
    pub fn apply_to(self, document: &mut SiteDocument) {
        if let Some(testimonials) = self.testimonials {
            document.testimonials = testimonials;
        }
        if let Some(audit_logs) = self.audit_logs {
            document.audit_logs = audit_logs;
        }
        if let Some(stats) = self.stats {
            document.stats = stats;
        }
        if let Some(config) = self.config {
            document.config = config;
        }
        if let Some(content) = self.content {
            document.content = content;
        }
    }
}
