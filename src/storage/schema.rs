//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.
//! The tables themselves are created by the sqlx migrations under `migrations/`.

use sea_query::Iden;

/// Site document table. Each managed section is a JSON text column so that a
/// patch can replace sections independently in one row update.
#[derive(Iden, Clone, Copy)]
pub enum SiteDocuments {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "version"]
    Version,
    #[iden = "testimonials"]
    Testimonials,
    #[iden = "audit_logs"]
    AuditLogs,
    #[iden = "stats"]
    Stats,
    #[iden = "config"]
    Config,
    #[iden = "content"]
    Content,
    #[iden = "updated_at"]
    UpdatedAt,
}

/// Review token ledger table.
#[derive(Iden, Clone, Copy)]
pub enum ReviewTokens {
    Table,
    #[iden = "token"]
    Token,
    #[iden = "used"]
    Used,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "used_at"]
    UsedAt,
}
