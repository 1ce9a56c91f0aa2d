//! The clinic scheduling API: configuration, services and route table.

mod app;
pub mod config;
pub mod services;
mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderName;
use clinic_axum::{AxumApp, TenantMiddleware};
use clinic_core::{
    CacheSettings, ClinicApp, PooledExecutor, ScopedExecutor, TenantRegistry, TenantResolver,
};
use clinic_postgres::{PgConnectionSource, PgPoolFactory, PgPoolSettings, PgTenantRegistry};
use serde_json::Value;

use crate::services::{ClinicParams, ClinicState};

/// Where tenants are looked up and where scoped statements run.
pub struct Backends {
    pub registry: Arc<dyn TenantRegistry>,
    pub executor: Arc<dyn ScopedExecutor>,
}

/// Build the app against PostgreSQL, configured from the environment.
pub async fn build() -> Result<AxumApp<Value, ClinicParams>> {
    let app = app::clinic_app()?;

    let settings = PgPoolSettings::from_config(&app.config_snapshot())?;
    let pool = PgPoolFactory::connect(&settings).await?;

    let backends = Backends {
        registry: Arc::new(PgTenantRegistry::new(pool.clone())),
        executor: Arc::new(PooledExecutor::new(PgConnectionSource::new(pool))),
    };
    build_with(app, backends)
}

/// Mount every route of the API on an already configured app.
pub fn build_with(
    app: ClinicApp<Value, ClinicParams>,
    backends: Backends,
) -> Result<AxumApp<Value, ClinicParams>> {
    let cfg = app.config_snapshot();

    let cache = CacheSettings {
        ttl: cfg.get_secs("tenant.cache_ttl_secs").unwrap_or_default(),
        capacity: cfg.get_usize("tenant.cache_capacity").unwrap_or(1024),
    };
    let resolver = TenantResolver::new(backends.registry).with_cache(cache);

    let header = cfg
        .get("tenant.header")
        .unwrap_or(clinic_axum::middleware::tenant::DEFAULT_TENANT_HEADER);
    let header = HeaderName::try_from(header.to_ascii_lowercase())
        .with_context(|| format!("tenant.header is not a valid header name: {header}"))?;
    let tenancy = TenantMiddleware::new(resolver.clone()).with_header(header);

    let mut state = ClinicState::new(backends.executor);
    if let Some(wait) = cfg.get_string("dashboard.avg_wait_time") {
        state = state.with_avg_wait_time(wait);
    }
    let state = Arc::new(state);

    let svcs = services::configure(Arc::clone(&state));

    let ax = clinic_axum::axum(app, tenancy)
        .use_service("/professionals", svcs.professionals)
        .use_service("/patients", svcs.patients)
        .use_service("/appointments", svcs.appointments)
        .use_service("/specialties", svcs.specialties)
        .use_service("/health-insurances", svcs.health_insurances)
        .use_service("/messages", svcs.messages)
        .use_router("/dashboard", services::dashboard::router(state))
        .use_router("/tenant", services::tenant::router(resolver))
        .use_get("/health", || async { "ok" });

    Ok(ax)
}
