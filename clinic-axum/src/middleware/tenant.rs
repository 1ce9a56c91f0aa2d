//! Per-request tenant resolution.
//!
//! Runs in front of every tenant-scoped route:
//!
//! ```text
//! Start → SlugExtracted → TenantResolving → TenantResolved    (next handler)
//!                                         → TenantNotFound    (404)
//!                                         → ResolutionFailed  (500)
//! ```
//!
//! A missing or empty header stops at `Start` with a 400 and never reaches
//! the registry.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::HeaderName;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use clinic_core::{ClinicError, TenancyError, TenantContext, TenantResolver, TenantSlug};
use tracing::{debug, error, warn};

use crate::ClinicAxumError;

pub const DEFAULT_TENANT_HEADER: &str = "x-tenant-slug";

/// State of the tenant middleware: the resolver and the header it reads.
#[derive(Clone)]
pub struct TenantMiddleware {
    resolver: TenantResolver,
    header: HeaderName,
}

impl TenantMiddleware {
    pub fn new(resolver: TenantResolver) -> Self {
        Self {
            resolver,
            header: HeaderName::from_static(DEFAULT_TENANT_HEADER),
        }
    }

    pub fn with_header(mut self, header: HeaderName) -> Self {
        self.header = header;
        self
    }

    pub fn resolver(&self) -> &TenantResolver {
        &self.resolver
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    fn slug(&self, req: &Request) -> Result<TenantSlug, TenancyError> {
        let raw = req
            .headers()
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        TenantSlug::new(raw)
    }
}

/// `axum::middleware::from_fn_with_state` entry point.
pub async fn resolve_tenant(
    State(tenancy): State<TenantMiddleware>,
    mut req: Request,
    next: Next,
) -> Result<Response, ClinicAxumError> {
    let slug = tenancy.slug(&req).inspect_err(|_| {
        debug!(header = %tenancy.header, path = %req.uri().path(), "tenant header missing");
    })?;

    let tenant = match tenancy.resolver.resolve(&slug).await {
        Ok(tenant) => tenant,
        Err(err @ TenancyError::TenantNotFound { .. }) => {
            warn!(tenant = %slug, "unknown or inactive tenant");
            return Err(err.into());
        }
        Err(err) => {
            error!(tenant = %slug, error = %err, "tenant resolution failed");
            return Err(err.into());
        }
    };

    req.extensions_mut().insert(tenant);
    Ok(next.run(req).await)
}

/// The tenant resolved for the current request.
///
/// Only available behind [`resolve_tenant`]; rejects with a 500 otherwise.
#[derive(Debug, Clone)]
pub struct Tenant(pub TenantContext);

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = ClinicAxumError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .map(Tenant)
            .ok_or_else(|| {
                ClinicError::general_error("Tenant context is not available for this route").into()
            })
    }
}
