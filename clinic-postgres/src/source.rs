//! Transaction-scoped sessions over a sqlx pool.
//!
//! A session is one `BEGIN`ed transaction on one pooled connection. The
//! search path is set with `set_config('search_path', ..., true)`, which
//! Postgres discards at commit or rollback, so the connection returns to
//! the pool with its default path. Dropping an uncommitted
//! [`sqlx::Transaction`] rolls it back.

use async_trait::async_trait;
use clinic_core::{
    BoxError, ConnectionSource, QueryResult, SchemaName, ScopedSession, Statement, StatementKind,
    TenancyError,
};
use serde_json::Value;
use sqlx::postgres::PgPool;
use sqlx::{Postgres, Row, Transaction};

use crate::bind::bind_params;

const SET_SEARCH_PATH: &str = "SELECT set_config('search_path', $1, true)";

/// Wrap a row-producing statement so all rows come back as one JSON array
/// of objects, columns in select order.
///
/// The array is built by a single aggregate fed straight from the CTE, so
/// it keeps the statement's `ORDER BY`. A CTE rather than a subquery, so
/// `INSERT/UPDATE/DELETE ... RETURNING` work too.
pub(crate) fn wrap_as_json_rows(sql: &str) -> String {
    let body = sql.trim().trim_end_matches(';').trim_end();
    format!("WITH t AS ({body}) SELECT COALESCE(json_agg(t.*), '[]'::json) FROM t")
}

/// The rows of an aggregated result; anything but an array is a driver bug.
fn json_rows(aggregated: Value) -> Result<Vec<Value>, BoxError> {
    match aggregated {
        Value::Array(rows) => Ok(rows),
        other => Err(format!("expected a JSON array of rows, got {other}").into()),
    }
}

#[derive(Clone)]
pub struct PgConnectionSource {
    pool: PgPool,
}

impl PgConnectionSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn acquire_failed(err: sqlx::Error) -> TenancyError {
    match err {
        sqlx::Error::PoolTimedOut => {
            TenancyError::pool_exhausted("timed out waiting for a connection")
        }
        sqlx::Error::PoolClosed => TenancyError::pool_exhausted("pool is closed"),
        other => TenancyError::pool_exhausted(other.to_string()),
    }
}

#[async_trait]
impl ConnectionSource for PgConnectionSource {
    type Session = PgSession;

    async fn acquire(&self) -> Result<PgSession, TenancyError> {
        let tx = self.pool.begin().await.map_err(acquire_failed)?;
        Ok(PgSession { tx })
    }
}

/// One open transaction on a pooled connection.
pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ScopedSession for PgSession {
    async fn set_search_path(&mut self, schema: &SchemaName) -> Result<(), BoxError> {
        sqlx::query(SET_SEARCH_PATH)
            .bind(schema.search_path())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn run(&mut self, statement: &Statement) -> Result<QueryResult, BoxError> {
        match statement.kind() {
            StatementKind::Rows => {
                let sql = wrap_as_json_rows(statement.sql());
                let row = bind_params(sqlx::query(&sql), statement.params())
                    .fetch_one(&mut *self.tx)
                    .await?;
                let rows = json_rows(row.try_get::<Value, _>(0)?)?;
                Ok(QueryResult::from_rows(rows))
            }
            StatementKind::Execute => {
                let done = bind_params(sqlx::query(statement.sql()), statement.params())
                    .execute(&mut *self.tx)
                    .await?;
                Ok(QueryResult::affected(done.rows_affected()))
            }
        }
    }

    async fn commit(self) -> Result<(), BoxError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_selects_and_returning_dml() {
        assert_eq!(
            wrap_as_json_rows("SELECT id, name FROM specialties ORDER BY name;"),
            "WITH t AS (SELECT id, name FROM specialties ORDER BY name) \
             SELECT COALESCE(json_agg(t.*), '[]'::json) FROM t"
        );
        assert_eq!(
            wrap_as_json_rows("  INSERT INTO specialties (name) VALUES ($1) RETURNING *  "),
            "WITH t AS (INSERT INTO specialties (name) VALUES ($1) RETURNING *) \
             SELECT COALESCE(json_agg(t.*), '[]'::json) FROM t"
        );
    }

    #[test]
    fn aggregated_rows_keep_their_order() {
        let rows = json_rows(serde_json::json!([{"id": 2}, {"id": 1}])).unwrap();
        assert_eq!(rows, vec![serde_json::json!({"id": 2}), serde_json::json!({"id": 1})]);

        assert!(json_rows(serde_json::json!([])).unwrap().is_empty());
        assert!(json_rows(serde_json::json!({"id": 1})).is_err());
    }

    #[test]
    fn timeouts_map_to_pool_exhausted() {
        assert!(matches!(
            acquire_failed(sqlx::Error::PoolTimedOut),
            TenancyError::PoolExhausted { .. }
        ));
        assert!(matches!(
            acquire_failed(sqlx::Error::PoolClosed),
            TenancyError::PoolExhausted { .. }
        ));
    }
}
