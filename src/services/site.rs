//! Caller-facing operations.
//!
//! Every operation returns a serializable response instead of an error.
//! Validation failures collapse to `false`/empty values, and only unexpected
//! failures carry an error string.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{DocumentMutator, SubmissionService, TokenLedger, ADMIN_ACTOR};
use crate::config::Config;
use crate::model::{SiteConfig, SiteDocument, Testimonial, TestimonialInput, TestimonialStatus};
use crate::storage::Stores;

/// `{token}` on success, `{error}` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueTokenResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateTokenResponse {
    pub valid: bool,
}

/// Testimonial submission through a review link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub testimonial: TestimonialInput,
    pub token: String,
}

/// `{success}` plus an error message on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

impl<E: ToString> From<Result<(), E>> for ActionResponse {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::failed(e),
        }
    }
}

/// Feature flags visible without authentication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub show_typing_animation: bool,
}

/// Site backend facade over the ledger, mutator and submission workflow.
pub struct SiteService {
    ledger: Arc<TokenLedger>,
    mutator: Arc<DocumentMutator>,
    submissions: SubmissionService,
}

impl SiteService {
    pub fn new(stores: Stores, config: &Config) -> Self {
        let (documents, tokens) = stores;
        let ledger = Arc::new(TokenLedger::new(tokens, &config.ledger));
        let mutator = Arc::new(DocumentMutator::new(documents, config.mutation.clone()));
        Self {
            submissions: SubmissionService::new(ledger.clone(), mutator.clone()),
            ledger,
            mutator,
        }
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn mutator(&self) -> &DocumentMutator {
        &self.mutator
    }

    pub async fn issue_token(&self) -> IssueTokenResponse {
        match self.ledger.issue().await {
            Ok(token) => IssueTokenResponse {
                token: Some(token),
                error: None,
            },
            Err(e) => IssueTokenResponse {
                token: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub async fn validate_token(&self, token: &str) -> ValidateTokenResponse {
        ValidateTokenResponse {
            valid: self.ledger.validate(token).await,
        }
    }

    pub async fn submit_testimonial(&self, request: SubmitRequest) -> ActionResponse {
        self.submissions
            .submit(request.testimonial, &request.token)
            .await
            .map(|_| ())
            .into()
    }

    /// Count a page view for today (UTC).
    pub async fn append_view(&self) -> ActionResponse {
        self.mutator.increment_view_counter().await.into()
    }

    /// Public flags; all `false` if the document cannot be read.
    pub async fn public_config(&self) -> PublicConfig {
        match self.mutator.read().await {
            Ok(document) => PublicConfig {
                show_typing_animation: document.config.show_typing_animation,
            },
            Err(e) => {
                warn!(error = %e, "Falling back to default public config");
                PublicConfig::default()
            }
        }
    }

    /// Approved testimonials, newest first; empty if the document cannot be read.
    pub async fn public_testimonials(&self) -> Vec<Testimonial> {
        match self.mutator.read().await {
            Ok(document) => document
                .testimonials
                .into_iter()
                .filter(|t| t.status == TestimonialStatus::Approved)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Public testimonials unavailable");
                Vec::new()
            }
        }
    }

    pub async fn moderate_testimonial(&self, id: &str, status: TestimonialStatus) -> ActionResponse {
        self.mutator
            .set_testimonial_status(id, status, ADMIN_ACTOR)
            .await
            .into()
    }

    pub async fn update_config(&self, config: SiteConfig) -> ActionResponse {
        self.mutator.update_config(config, ADMIN_ACTOR).await.into()
    }

    /// Administrative whole-document replace (last-writer-wins).
    pub async fn replace_document(&self, document: SiteDocument) -> ActionResponse {
        self.mutator
            .upsert_document(document, ADMIN_ACTOR)
            .await
            .map(|_| ())
            .into()
    }
}
