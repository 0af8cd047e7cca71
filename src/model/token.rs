//! Review token ledger rows.

use serde::{Deserialize, Serialize};

/// Single-use capability authorizing one testimonial submission.
///
/// `used` moves from `false` to `true` exactly once and is never reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewToken {
    pub token: String,
    pub used: bool,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<String>,
}

impl ReviewToken {
    /// A freshly issued, unused token.
    pub fn issued(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            used: false,
            created_at: super::now_rfc3339(),
            used_at: None,
        }
    }
}
