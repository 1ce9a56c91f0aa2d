//! `GET /tenant`: who the current request resolved to.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use clinic_axum::{ClinicAxumError, Tenant};
use clinic_core::{TenantContext, TenantResolver};

pub fn router(resolver: TenantResolver) -> Router {
    Router::new().route("/", get(describe)).with_state(resolver)
}

async fn describe(
    State(resolver): State<TenantResolver>,
    Tenant(tenant): Tenant,
) -> Result<Json<TenantContext>, ClinicAxumError> {
    Ok(Json(resolver.describe(&tenant.slug).await?))
}
