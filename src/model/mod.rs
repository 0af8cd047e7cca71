//! Site document and review token data model.
//!
//! The site document is a single shared record holding testimonials, the
//! audit trail, view counters, feature flags and any other admin-managed
//! content. Review tokens live in a separate ledger and never reference the
//! document directly.

mod audit;
mod document;
mod stats;
mod testimonial;
mod token;

pub use audit::{AuditEntry, AuditLog, AUDIT_LOG_CAPACITY};
pub use document::{DocumentPatch, SiteConfig, SiteDocument, VersionedDocument, SITE_DOCUMENT_KEY};
pub use stats::ViewStats;
pub use testimonial::{Testimonial, TestimonialInput, TestimonialSource, TestimonialStatus};
pub use token::ReviewToken;

use serde_json::{Map, Value};
use uuid::Uuid;

/// Generate a record id from the current timestamp and a random suffix.
///
/// Ids sort roughly by creation time. Uniqueness rests on the suffix and is
/// not guaranteed.
pub fn generate_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), &suffix[..12])
}

/// Remove entries of a flattened map whose keys belong to typed fields.
///
/// A flattened map serializes next to the typed fields, so a shared key would
/// be written twice and the record could no longer be read back.
fn drop_owned_keys(extra: &mut Map<String, Value>, owned: &[&str]) {
    extra.retain(|key, _| !owned.contains(&key.as_str()));
}

/// Current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
