use async_trait::async_trait;
use anyhow::Result;

use crate::errors::ClinicError;
use crate::tenant::TenantContext;

/// Standard service methods:
/// find, get, create, update, patch, remove.
///
/// Custom methods are declared via `Custom("methodName")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceMethodKind {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
    Custom(&'static str),
}

/// Which methods a service exposes to the outside world.
///
/// The REST adapter mounts only the routes listed here.
#[derive(Debug, Clone)]
pub struct ServiceCapabilities {
    pub allowed_methods: Vec<ServiceMethodKind>,
}

impl ServiceCapabilities {
    pub fn standard_crud() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Get, Create, Update, Patch, Remove],
        }
    }

    pub fn from_methods(methods: Vec<ServiceMethodKind>) -> Self {
        Self {
            allowed_methods: methods,
        }
    }

    pub fn allows(&self, method: &ServiceMethodKind) -> bool {
        self.allowed_methods.contains(method)
    }

    /// Names of the declared custom methods.
    pub fn custom_methods(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.allowed_methods.iter().filter_map(|m| match m {
            ServiceMethodKind::Custom(name) => Some(*name),
            _ => None,
        })
    }
}

fn not_implemented<T>(method: &str) -> Result<T> {
    Err(ClinicError::method_not_allowed(format!("Method not implemented: {method}")).into_anyhow())
}

/// A tenant-scoped resource service:
///
/// - `find`   → list/query many
/// - `get`    → fetch one by id
/// - `create` → create one
/// - `update` → full replace
/// - `patch`  → partial update
/// - `remove` → delete one
/// - `custom` → a named action on one record
///
/// Every method receives the resolved [`TenantContext`]; implementations
/// pass its schema to the scoped executor. Unsupported methods fall back to
/// a `MethodNotAllowed` error.
#[async_trait]
pub trait ClinicService<R, P = ()>: Send + Sync
where
    R: Send + 'static,
    P: Send + 'static,
{
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::standard_crud()
    }

    async fn find(&self, _ctx: &TenantContext, _params: P) -> Result<Vec<R>> {
        not_implemented("find")
    }

    async fn get(&self, _ctx: &TenantContext, _id: &str, _params: P) -> Result<R> {
        not_implemented("get")
    }

    async fn create(&self, _ctx: &TenantContext, _data: R, _params: P) -> Result<R> {
        not_implemented("create")
    }

    async fn update(&self, _ctx: &TenantContext, _id: &str, _data: R, _params: P) -> Result<R> {
        not_implemented("update")
    }

    async fn patch(&self, _ctx: &TenantContext, _id: &str, _data: R, _params: P) -> Result<R> {
        not_implemented("patch")
    }

    async fn remove(&self, _ctx: &TenantContext, _id: &str, _params: P) -> Result<R> {
        not_implemented("remove")
    }

    async fn custom(
        &self,
        _ctx: &TenantContext,
        method: &str,
        _id: &str,
        _data: R,
        _params: P,
    ) -> Result<R> {
        not_implemented(method)
    }
}
