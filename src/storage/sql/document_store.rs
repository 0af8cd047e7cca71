//! Unified SQL DocumentStore implementation.
//!
//! Uses a macro to generate implementations for each SQL backend,
//! eliminating code duplication while maintaining type safety.

use std::marker::PhantomData;

use sea_query::SimpleExpr;

use super::SqlDatabase;
use crate::model::{DocumentPatch, SiteDocument};
use crate::storage::schema::SiteDocuments;
use crate::storage::Result;

/// SQL-based implementation of DocumentStore.
///
/// Sections are stored as JSON text in their own columns and the version
/// column backs compare-and-swap writes.
pub struct SqlDocumentStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlDocumentStore<DB> {
    /// Create a new SQL document store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

/// Raw JSON text of each stored section, in column order.
struct SectionText {
    testimonials: String,
    audit_logs: String,
    stats: String,
    config: String,
    content: String,
}

impl SectionText {
    fn encode(document: &SiteDocument) -> Result<Self> {
        Ok(Self {
            testimonials: serde_json::to_string(&document.testimonials)?,
            audit_logs: serde_json::to_string(&document.audit_logs)?,
            stats: serde_json::to_string(&document.stats)?,
            config: serde_json::to_string(&document.config)?,
            content: serde_json::to_string(&document.content)?,
        })
    }

    fn decode(self) -> Result<SiteDocument> {
        Ok(SiteDocument {
            testimonials: serde_json::from_str(&self.testimonials)?,
            audit_logs: serde_json::from_str(&self.audit_logs)?,
            stats: serde_json::from_str(&self.stats)?,
            config: serde_json::from_str(&self.config)?,
            content: serde_json::from_str(&self.content)?,
        })
    }
}

/// Column assignments for the sections present in `patch`.
fn patch_values(patch: &DocumentPatch) -> Result<Vec<(SiteDocuments, SimpleExpr)>> {
    let mut values = Vec::new();
    if let Some(testimonials) = &patch.testimonials {
        values.push((
            SiteDocuments::Testimonials,
            serde_json::to_string(testimonials)?.into(),
        ));
    }
    if let Some(audit_logs) = &patch.audit_logs {
        values.push((
            SiteDocuments::AuditLogs,
            serde_json::to_string(audit_logs)?.into(),
        ));
    }
    if let Some(stats) = &patch.stats {
        values.push((SiteDocuments::Stats, serde_json::to_string(stats)?.into()));
    }
    if let Some(config) = &patch.config {
        values.push((SiteDocuments::Config, serde_json::to_string(config)?.into()));
    }
    if let Some(content) = &patch.content {
        values.push((SiteDocuments::Content, serde_json::to_string(content)?.into()));
    }
    Ok(values)
}

/// Macro to implement DocumentStore for a specific SQL backend.
macro_rules! impl_document_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::DocumentStore for SqlDocumentStore<$db_type> {
            async fn get(
                &self,
                key: &str,
            ) -> crate::storage::Result<Option<crate::model::VersionedDocument>> {
                use sea_query::{Expr, Query};
                use sqlx::Row;

                let stmt = Query::select()
                    .columns([
                        SiteDocuments::Version,
                        SiteDocuments::Testimonials,
                        SiteDocuments::AuditLogs,
                        SiteDocuments::Stats,
                        SiteDocuments::Config,
                        SiteDocuments::Content,
                    ])
                    .from(SiteDocuments::Table)
                    .and_where(Expr::col(SiteDocuments::Id).eq(key))
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;

                let Some(row) = row else {
                    return Ok(None);
                };

                let version: i64 = row.try_get("version")?;
                let sections = SectionText {
                    testimonials: row.try_get("testimonials")?,
                    audit_logs: row.try_get("audit_logs")?,
                    stats: row.try_get("stats")?,
                    config: row.try_get("config")?,
                    content: row.try_get("content")?,
                };

                Ok(Some(crate::model::VersionedDocument {
                    version: version as u64,
                    document: sections.decode()?,
                }))
            }

            async fn write(
                &self,
                key: &str,
                patch: crate::model::DocumentPatch,
                precondition: crate::storage::WritePrecondition,
            ) -> crate::storage::Result<u64> {
                use sea_query::{Expr, Query};
                use sqlx::Row;

                use crate::storage::{StorageError, WritePrecondition};

                // sea-query expressions are not Send; render before awaiting
                let sql = {
                    let mut values = patch_values(&patch)?;
                    values.push((
                        SiteDocuments::UpdatedAt,
                        crate::model::now_rfc3339().into(),
                    ));

                    let mut stmt = Query::update();
                    stmt.table(SiteDocuments::Table)
                        .and_where(Expr::col(SiteDocuments::Id).eq(key));

                    match precondition {
                        WritePrecondition::Version(expected) => {
                            values.push((SiteDocuments::Version, (expected as i64 + 1).into()));
                            stmt.and_where(Expr::col(SiteDocuments::Version).eq(expected as i64));
                        }
                        WritePrecondition::Unconditional => {
                            values.push((
                                SiteDocuments::Version,
                                Expr::col(SiteDocuments::Version).add(1),
                            ));
                        }
                    }
                    stmt.values(values).returning_col(SiteDocuments::Version);

                    <$db_type>::build_update(stmt)
                };
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;

                if let Some(row) = row {
                    let version: i64 = row.try_get("version")?;
                    return Ok(version as u64);
                }

                // No row matched: tell a missing document from a lost race
                match (crate::storage::DocumentStore::get(self, key).await?, precondition) {
                    (None, _) => Err(StorageError::NotFound {
                        key: key.to_string(),
                    }),
                    (Some(current), WritePrecondition::Version(expected)) => {
                        Err(StorageError::VersionConflict {
                            key: key.to_string(),
                            expected,
                            actual: current.version,
                        })
                    }
                    (Some(_), WritePrecondition::Unconditional) => Err(StorageError::Backend(
                        format!("unconditional update of {} matched no rows", key),
                    )),
                }
            }

            async fn upsert(
                &self,
                key: &str,
                document: crate::model::SiteDocument,
            ) -> crate::storage::Result<u64> {
                use sea_query::{Expr, OnConflict, Query};
                use sqlx::Row;

                let sections = SectionText::encode(&document)?;

                let stmt = Query::insert()
                    .into_table(SiteDocuments::Table)
                    .columns([
                        SiteDocuments::Id,
                        SiteDocuments::Version,
                        SiteDocuments::Testimonials,
                        SiteDocuments::AuditLogs,
                        SiteDocuments::Stats,
                        SiteDocuments::Config,
                        SiteDocuments::Content,
                        SiteDocuments::UpdatedAt,
                    ])
                    .values_panic([
                        key.into(),
                        1i64.into(),
                        sections.testimonials.into(),
                        sections.audit_logs.into(),
                        sections.stats.into(),
                        sections.config.into(),
                        sections.content.into(),
                        crate::model::now_rfc3339().into(),
                    ])
                    .on_conflict(
                        OnConflict::column(SiteDocuments::Id)
                            .update_columns([
                                SiteDocuments::Testimonials,
                                SiteDocuments::AuditLogs,
                                SiteDocuments::Stats,
                                SiteDocuments::Config,
                                SiteDocuments::Content,
                                SiteDocuments::UpdatedAt,
                            ])
                            .value(
                                SiteDocuments::Version,
                                Expr::col((SiteDocuments::Table, SiteDocuments::Version)).add(1),
                            )
                            .to_owned(),
                    )
                    .returning_col(SiteDocuments::Version)
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
                let version: i64 = row.try_get("version")?;

                Ok(version as u64)
            }

            async fn create_if_absent(
                &self,
                key: &str,
                document: crate::model::SiteDocument,
            ) -> crate::storage::Result<bool> {
                use sea_query::{OnConflict, Query};

                let sections = SectionText::encode(&document)?;

                let stmt = Query::insert()
                    .into_table(SiteDocuments::Table)
                    .columns([
                        SiteDocuments::Id,
                        SiteDocuments::Version,
                        SiteDocuments::Testimonials,
                        SiteDocuments::AuditLogs,
                        SiteDocuments::Stats,
                        SiteDocuments::Config,
                        SiteDocuments::Content,
                        SiteDocuments::UpdatedAt,
                    ])
                    .values_panic([
                        key.into(),
                        1i64.into(),
                        sections.testimonials.into(),
                        sections.audit_logs.into(),
                        sections.stats.into(),
                        sections.config.into(),
                        sections.content.into(),
                        crate::model::now_rfc3339().into(),
                    ])
                    .on_conflict(OnConflict::column(SiteDocuments::Id).do_nothing().to_owned())
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;

                Ok(result.rows_affected() == 1)
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_document_store!(super::postgres::Postgres, "postgres");
impl_document_store!(super::sqlite::Sqlite, "sqlite");
