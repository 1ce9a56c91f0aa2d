//! Core multi-tenant types.
//!
//! A tenant is one clinic, isolated in its own PostgreSQL schema. Requests
//! carry a [`TenantSlug`]; resolution turns it into a [`TenantContext`],
//! which is what services receive.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::TenancyError;

/// Routing key of a tenant, e.g. `cir` for `cir.painelagenda.com.br`.
///
/// Matched exactly and case-sensitively against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantSlug(String);

impl TenantSlug {
    /// Rejects the empty string; no other normalization is applied.
    pub fn new(slug: impl Into<String>) -> Result<Self, TenancyError> {
        let slug = slug.into();
        if slug.is_empty() {
            return Err(TenancyError::MissingTenantIdentifier);
        }
        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a tenant schema as stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaName(String);

impl SchemaName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a quoted SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }

    /// Value for the session `search_path`: the tenant schema, then `public`.
    pub fn search_path(&self) -> String {
        format!("{}, public", self.quoted())
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A row of `public.tenants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub slug: String,
    pub schema_name: String,
    pub primary_domain: String,
    pub is_active: bool,
}

impl TenantRecord {
    pub fn new(
        slug: impl Into<String>,
        schema_name: impl Into<String>,
        primary_domain: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            schema_name: schema_name.into(),
            primary_domain: primary_domain.into(),
            is_active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Context carried with every tenant-scoped operation.
///
/// Produced by the resolver and passed into services, which hand `schema`
/// to the scoped executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    pub slug: TenantSlug,
    #[serde(rename = "schema_name")]
    pub schema: SchemaName,
    pub primary_domain: String,
}

impl TenantContext {
    pub fn new(slug: TenantSlug, schema: SchemaName, primary_domain: impl Into<String>) -> Self {
        Self {
            slug,
            schema,
            primary_domain: primary_domain.into(),
        }
    }

    pub(crate) fn from_record(record: TenantRecord) -> Result<Self, TenancyError> {
        Ok(Self {
            slug: TenantSlug::new(record.slug)?,
            schema: SchemaName::new(record.schema_name),
            primary_domain: record.primary_domain,
        })
    }
}
