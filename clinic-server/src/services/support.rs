//! Small helpers shared by the table-backed services.

use anyhow::Result;
use clinic_core::{ClinicError, QueryResult, SqlParam, Statement};
use serde_json::Value;
use uuid::Uuid;

pub fn int_id(id: &str) -> Result<i64> {
    id.trim()
        .parse::<i64>()
        .map_err(|_| ClinicError::bad_request(format!("Invalid id: {id}")).into_anyhow())
}

pub fn uuid_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim())
        .map_err(|_| ClinicError::bad_request(format!("Invalid id: {id}")).into_anyhow())
}

/// An id compared as text, for tables whose key may be serial or uuid.
pub fn text_id(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ClinicError::bad_request("Invalid id: empty").into_anyhow());
    }
    Ok(id.to_string())
}

/// The single row a `RETURNING` / by-id statement produced, or 404.
pub fn one_row(result: QueryResult, entity: &str, id: &str) -> Result<Value> {
    result
        .into_first()
        .ok_or_else(|| ClinicError::not_found(format!("{entity} not found: {id}")).into_anyhow())
}

/// 404 when a `DELETE` touched nothing; otherwise `{ "id": id }`.
pub fn deleted(result: QueryResult, entity: &str, id: &str) -> Result<Value> {
    if result.rows_affected == 0 {
        return Err(ClinicError::not_found(format!("{entity} not found: {id}")).into_anyhow());
    }
    Ok(serde_json::json!({ "id": id }))
}

/// Escape `%`, `_` and `\` for use inside a `LIKE` pattern.
pub fn like_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Accumulates `AND`-joined conditions with positional parameters.
#[derive(Debug, Default)]
pub struct Conditions {
    clauses: Vec<String>,
    params: Vec<SqlParam>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition; `{}` in `clause` is replaced with the parameter's placeholder.
    pub fn push(&mut self, clause: &str, param: impl Into<SqlParam>) {
        self.params.push(param.into());
        let placeholder = format!("${}", self.params.len());
        self.clauses.push(clause.replace("{}", &placeholder));
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of parameters bound so far.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// `" WHERE a AND b"`, or an empty string.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Build the statement, binding the collected parameters in order.
    pub fn into_statement(self, name: &str, sql: String) -> Statement {
        self.params
            .into_iter()
            .fold(Statement::rows(name, sql), |stmt, p| stmt.bind(p))
    }
}
