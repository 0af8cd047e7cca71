//! Audit trail entries and the bounded log that holds them.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Maximum number of audit entries retained in the site document.
pub const AUDIT_LOG_CAPACITY: usize = 200;

/// One audit trail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    /// Free-form action tag, e.g. `TESTIMONIAL_SUBMIT`.
    pub action: String,
    pub details: String,
    pub timestamp: String,
    /// Actor label, e.g. `Public User`.
    pub user: String,
}

impl AuditEntry {
    pub fn new(action: impl Into<String>, details: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            id: super::generate_id(),
            action: action.into(),
            details: details.into(),
            timestamp: super::now_rfc3339(),
            user: user.into(),
        }
    }
}

/// Newest-first audit log holding at most [`AUDIT_LOG_CAPACITY`] entries.
///
/// Recording past capacity evicts the oldest entries. The cap also applies
/// when a stored list is deserialized, so an oversized payload written by an
/// older writer is trimmed on the next read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AuditEntry>", into = "Vec<AuditEntry>")]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry as the newest, evicting the oldest beyond capacity.
    pub fn record(&mut self, entry: AuditEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(AUDIT_LOG_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recently recorded entry.
    pub fn newest(&self) -> Option<&AuditEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }
}

impl From<Vec<AuditEntry>> for AuditLog {
    fn from(mut entries: Vec<AuditEntry>) -> Self {
        entries.truncate(AUDIT_LOG_CAPACITY);
        Self {
            entries: entries.into(),
        }
    }
}

impl From<AuditLog> for Vec<AuditEntry> {
    fn from(log: AuditLog) -> Self {
        log.entries.into()
    }
}
