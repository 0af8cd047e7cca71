//! Token ledger, document mutation and the workflows built on them.

pub mod document;
pub mod ledger;
pub mod site;
pub mod submission;

pub use document::{DocumentMutator, MutationError, ADMIN_ACTOR, PUBLIC_ACTOR};
pub use ledger::{generate_token, LedgerError, TokenLedger};
pub use site::{
    ActionResponse, IssueTokenResponse, PublicConfig, SiteService, SubmitRequest,
    ValidateTokenResponse,
};
pub use submission::{SubmissionError, SubmissionService};
