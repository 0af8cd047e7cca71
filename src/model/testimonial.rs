//! Testimonials and their submission input.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Moderation state of a testimonial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestimonialStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for TestimonialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Where a testimonial came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestimonialSource {
    /// Entered by an administrator.
    #[default]
    Internal,
    /// Submitted through a review link.
    External,
}

/// Fields a reviewer submits through a review link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialInput {
    pub author: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Any other submitted fields, stored as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TestimonialInput {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Returns a description of the first missing required field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.author.trim().is_empty() {
            Some("author")
        } else if self.content.trim().is_empty() {
            Some("content")
        } else {
            None
        }
    }
}

/// Serialized names of the typed testimonial fields.
const TESTIMONIAL_FIELDS: &[&str] = &[
    "id", "author", "content", "role", "rating", "status", "source", "date",
];

/// A testimonial as stored in the site document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: String,
    pub author: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default)]
    pub status: TestimonialStatus,
    #[serde(default)]
    pub source: TestimonialSource,
    /// Creation time, RFC 3339.
    pub date: String,
    /// Never holds the name of a typed field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Testimonial {
    /// Build a pending testimonial from reviewer input.
    ///
    /// Submitted extras named like a typed field are discarded.
    pub fn from_input(input: TestimonialInput, source: TestimonialSource) -> Self {
        let mut extra = input.extra;
        super::drop_owned_keys(&mut extra, TESTIMONIAL_FIELDS);
        Self {
            id: super::generate_id(),
            author: input.author.trim().to_string(),
            content: input.content.trim().to_string(),
            role: input.role,
            rating: input.rating,
            status: TestimonialStatus::Pending,
            source,
            date: super::now_rfc3339(),
            extra,
        }
    }

    pub(crate) fn drop_shadowed_extras(&mut self) {
        super::drop_owned_keys(&mut self.extra, TESTIMONIAL_FIELDS);
    }
}
