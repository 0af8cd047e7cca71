//! Unified SQL TokenStore implementation.

use std::marker::PhantomData;

use super::SqlDatabase;
use crate::storage::schema::ReviewTokens;

/// SQL-based implementation of TokenStore.
pub struct SqlTokenStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlTokenStore<DB> {
    /// Create a new SQL token ledger with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

/// Macro to implement TokenStore for a specific SQL backend.
macro_rules! impl_token_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::TokenStore for SqlTokenStore<$db_type> {
            async fn insert(&self, token: &crate::model::ReviewToken) -> crate::storage::Result<()> {
                use sea_query::Query;

                let stmt = Query::insert()
                    .into_table(ReviewTokens::Table)
                    .columns([
                        ReviewTokens::Token,
                        ReviewTokens::Used,
                        ReviewTokens::CreatedAt,
                        ReviewTokens::UsedAt,
                    ])
                    .values_panic([
                        token.token.as_str().into(),
                        token.used.into(),
                        token.created_at.as_str().into(),
                        token.used_at.clone().into(),
                    ])
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                sqlx::query(&sql).execute(&self.pool).await?;

                Ok(())
            }

            async fn get(
                &self,
                token: &str,
            ) -> crate::storage::Result<Option<crate::model::ReviewToken>> {
                use sea_query::{Expr, Query};
                use sqlx::Row;

                let stmt = Query::select()
                    .columns([
                        ReviewTokens::Token,
                        ReviewTokens::Used,
                        ReviewTokens::CreatedAt,
                        ReviewTokens::UsedAt,
                    ])
                    .from(ReviewTokens::Table)
                    .and_where(Expr::col(ReviewTokens::Token).eq(token))
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;

                match row {
                    Some(row) => Ok(Some(crate::model::ReviewToken {
                        token: row.try_get("token")?,
                        used: row.try_get("used")?,
                        created_at: row.try_get("created_at")?,
                        used_at: row.try_get("used_at")?,
                    })),
                    None => Ok(None),
                }
            }

            async fn mark_used(&self, token: &str) -> crate::storage::Result<bool> {
                use sea_query::{Expr, Query};

                let stmt = Query::update()
                    .table(ReviewTokens::Table)
                    .values([
                        (ReviewTokens::Used, true.into()),
                        (ReviewTokens::UsedAt, crate::model::now_rfc3339().into()),
                    ])
                    .and_where(Expr::col(ReviewTokens::Token).eq(token))
                    .and_where(Expr::col(ReviewTokens::Used).eq(false))
                    .to_owned();

                let sql = <$db_type>::build_update(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;

                Ok(result.rows_affected() == 1)
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_token_store!(super::postgres::Postgres, "postgres");
impl_token_store!(super::sqlite::Sqlite, "sqlite");
