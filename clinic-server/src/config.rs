use std::env;

use anyhow::{anyhow, Result};
use clinic_core::ClinicApp;
use serde_json::Value;

use crate::services::ClinicParams;

/// Populate the app config from the process environment.
pub fn config(app: &ClinicApp<Value, ClinicParams>) -> Result<()> {
    config_from(app, |key| env::var(key).ok())
}

/// Populate the app config from `lookup` (an environment-like source).
pub fn config_from<F>(app: &ClinicApp<Value, ClinicParams>, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let env = Env { lookup };

    configure_http(app, &env)?;
    configure_database(app, &env)?;
    configure_tenancy(app, &env)?;
    configure_dashboard(app, &env);

    Ok(())
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.var(key).unwrap_or_else(|| default.to_string())
    }

    /// A numeric variable; set but unparseable is an error, not a silent default.
    fn number(&self, key: &str, default: u64) -> Result<String> {
        match self.var(key) {
            None => Ok(default.to_string()),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(|n| n.to_string())
                .map_err(|_| anyhow!("{key} must be a non-negative integer, got {raw:?}")),
        }
    }
}

/// Configure HTTP server settings
fn configure_http<F>(app: &ClinicApp<Value, ClinicParams>, env: &Env<F>) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    app.set("http.host", env.or("HTTP_HOST", "127.0.0.1"));
    app.set("http.port", env.number("PORT", 3000)?);
    Ok(())
}

/// Connection target and pool limits
fn configure_database<F>(app: &ClinicApp<Value, ClinicParams>, env: &Env<F>) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env.var("DATABASE_URL") {
        app.set("db.url", url);
    }
    app.set("db.host", env.or("DB_HOST", "localhost"));
    app.set("db.port", env.number("DB_PORT", 5432)?);
    app.set("db.user", env.or("DB_USER", "postgres"));
    app.set("db.password", env.or("DB_PASSWORD", ""));
    app.set("db.name", env.or("DB_NAME", "painelagenda"));

    app.set("db.max_connections", env.number("DB_MAX_CONNECTIONS", 20)?);
    app.set("db.idle_timeout_secs", env.number("DB_IDLE_TIMEOUT_SECS", 30)?);
    app.set("db.acquire_timeout_secs", env.number("DB_ACQUIRE_TIMEOUT_SECS", 5)?);
    Ok(())
}

/// Tenant header and resolver cache
fn configure_tenancy<F>(app: &ClinicApp<Value, ClinicParams>, env: &Env<F>) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    app.set(
        "tenant.header",
        env.or("TENANT_HEADER", clinic_axum::middleware::tenant::DEFAULT_TENANT_HEADER),
    );
    app.set("tenant.cache_ttl_secs", env.number("TENANT_CACHE_TTL_SECS", 0)?);
    app.set("tenant.cache_capacity", env.number("TENANT_CACHE_CAPACITY", 1024)?);
    Ok(())
}

fn configure_dashboard<F>(app: &ClinicApp<Value, ClinicParams>, env: &Env<F>)
where
    F: Fn(&str) -> Option<String>,
{
    app.set("dashboard.avg_wait_time", env.or("DASHBOARD_AVG_WAIT_TIME", "15min"));
}
