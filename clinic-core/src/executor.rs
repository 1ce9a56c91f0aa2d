//! Schema-scoped statement execution.
//!
//! [`ScopedExecutor::run_scoped`] is the only way services reach the
//! database: acquire a pooled connection, set its search path to
//! `[tenant schema, public]` for the current transaction only, run one
//! statement, commit, release. The connection never escapes; the session
//! guard returns it to the pool when dropped, on every exit path.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{BoxError, TenancyError};
use crate::tenant::SchemaName;

/// A typed, nullable statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Bool(Option<bool>),
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Uuid(Option<Uuid>),
    Date(Option<NaiveDate>),
    Timestamp(Option<DateTime<Utc>>),
    Json(Option<Value>),
}

macro_rules! sql_param_from {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for SqlParam {
            fn from(v: $ty) -> Self {
                SqlParam::$variant(Some(v.into()))
            }
        }

        impl From<Option<$ty>> for SqlParam {
            fn from(v: Option<$ty>) -> Self {
                SqlParam::$variant(v.map(Into::into))
            }
        }
    };
}

sql_param_from!(Bool, bool);
sql_param_from!(Int, i64);
sql_param_from!(Int, i32);
sql_param_from!(Float, f64);
sql_param_from!(Text, String);
sql_param_from!(Text, &str);
sql_param_from!(Uuid, Uuid);
sql_param_from!(Date, NaiveDate);
sql_param_from!(Timestamp, DateTime<Utc>);
sql_param_from!(Json, Value);

/// What a statement produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// A row set: `SELECT`, or DML with `RETURNING`.
    Rows,
    /// An affected-row count only.
    Execute,
}

/// One SQL statement with its bound parameters.
///
/// `name` identifies the statement in logs and error payloads; the SQL text
/// itself is never sent to clients.
#[derive(Debug, Clone)]
pub struct Statement {
    name: String,
    sql: String,
    params: Vec<SqlParam>,
    kind: StatementKind,
}

impl Statement {
    pub fn rows(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(name, sql, StatementKind::Rows)
    }

    pub fn execute(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(name, sql, StatementKind::Execute)
    }

    fn new(name: impl Into<String>, sql: impl Into<String>, kind: StatementKind) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
            params: Vec::new(),
            kind,
        }
    }

    /// Bind the next positional parameter (`$1`, `$2`, ...).
    pub fn bind(mut self, param: impl Into<SqlParam>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }
}

/// Rows (as JSON objects) and field names of a statement's result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub fields: Vec<String>,
    pub rows: Vec<Value>,
    pub rows_affected: u64,
}

impl QueryResult {
    pub fn from_rows(rows: Vec<Value>) -> Self {
        let fields = rows
            .first()
            .and_then(Value::as_object)
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default();
        let rows_affected = rows.len() as u64;
        Self {
            fields,
            rows,
            rows_affected,
        }
    }

    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }

    pub fn first(&self) -> Option<&Value> {
        self.rows.first()
    }

    pub fn into_first(self) -> Option<Value> {
        self.rows.into_iter().next()
    }
}

/// A pool of database connections that hands out scoped sessions.
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    type Session: ScopedSession;

    /// Check out one connection and open a transaction on it.
    ///
    /// Must give up after the pool's acquire timeout with
    /// [`TenancyError::PoolExhausted`].
    async fn acquire(&self) -> Result<Self::Session, TenancyError>;
}

/// One checked-out connection inside one transaction.
///
/// Dropping a session without [`ScopedSession::commit`] rolls the
/// transaction back. Either way the transaction-local search path is gone
/// and the connection goes back to its pool.
#[async_trait]
pub trait ScopedSession: Send {
    async fn set_search_path(&mut self, schema: &SchemaName) -> Result<(), BoxError>;

    async fn run(&mut self, statement: &Statement) -> Result<QueryResult, BoxError>;

    async fn commit(self) -> Result<(), BoxError>;
}

/// Runs statements scoped to a tenant schema.
#[async_trait]
pub trait ScopedExecutor: Send + Sync {
    async fn run_scoped(
        &self,
        schema: &SchemaName,
        statement: &Statement,
    ) -> Result<QueryResult, TenancyError>;
}

/// [`ScopedExecutor`] over any [`ConnectionSource`].
pub struct PooledExecutor<S> {
    source: S,
}

impl<S> PooledExecutor<S>
where
    S: ConnectionSource,
{
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[async_trait]
impl<S> ScopedExecutor for PooledExecutor<S>
where
    S: ConnectionSource,
{
    async fn run_scoped(
        &self,
        schema: &SchemaName,
        statement: &Statement,
    ) -> Result<QueryResult, TenancyError> {
        let started = Instant::now();
        let failed = |e: BoxError| {
            let err = TenancyError::statement_failed(schema.as_str(), statement.name(), e);
            warn!(schema = %schema, statement = statement.name(), error = %err, "scoped statement failed");
            err
        };

        let mut session = self.source.acquire().await.inspect_err(|err| {
            warn!(schema = %schema, statement = statement.name(), error = %err, "connection acquire failed");
        })?;

        session.set_search_path(schema).await.map_err(failed)?;
        let result = session.run(statement).await.map_err(failed)?;
        session.commit().await.map_err(failed)?;

        debug!(
            schema = %schema,
            statement = statement.name(),
            rows = result.rows_affected,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scoped statement completed"
        );
        Ok(result)
    }
}
