//! The public testimonial submission workflow.
//!
//! Order is fixed: check input, validate the token, append the testimonial,
//! consume the token. A failed append leaves the token unused so the reviewer
//! can retry with the same link. A failed consume after a committed append is
//! logged and the submission still succeeds; the token may then be usable
//! once more.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::{DocumentMutator, MutationError, TokenLedger};
use crate::model::{Testimonial, TestimonialInput, TestimonialSource};

/// Errors returned to a submitting reviewer.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Testimonial is missing {field}")]
    InvalidTestimonial { field: &'static str },

    /// The token is unknown or already consumed.
    #[error("Review link is invalid or has already been used")]
    InvalidToken,

    /// The document mutation failed; the token was not consumed.
    #[error("Failed to save testimonial: {0}")]
    Failed(#[source] MutationError),
}

/// Submission Orchestrator.
pub struct SubmissionService {
    ledger: Arc<TokenLedger>,
    mutator: Arc<DocumentMutator>,
}

impl SubmissionService {
    pub fn new(ledger: Arc<TokenLedger>, mutator: Arc<DocumentMutator>) -> Self {
        Self { ledger, mutator }
    }

    /// Submit a testimonial authorized by `token`.
    ///
    /// Returns the stored testimonial.
    pub async fn submit(
        &self,
        input: TestimonialInput,
        token: &str,
    ) -> Result<Testimonial, SubmissionError> {
        if let Some(field) = input.missing_field() {
            return Err(SubmissionError::InvalidTestimonial { field });
        }

        if !self.ledger.validate(token).await {
            info!("Submission rejected: review link invalid or used");
            return Err(SubmissionError::InvalidToken);
        }

        let testimonial = Testimonial::from_input(input, TestimonialSource::External);
        if let Err(e) = self.mutator.append_testimonial(testimonial.clone()).await {
            warn!(error = %e, "Submission failed, review token left unused");
            return Err(SubmissionError::Failed(e));
        }

        if let Err(e) = self.ledger.consume(token).await {
            error!(
                testimonial = %testimonial.id,
                error = %e,
                "Testimonial saved but review token was not consumed"
            );
        }

        Ok(testimonial)
    }
}
