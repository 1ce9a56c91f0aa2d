pub mod dashboard_service;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use clinic_axum::{ClinicAxumError, Tenant};

use crate::services::ClinicState;

pub use dashboard_service::{DashboardService, DashboardStats};

/// `GET /dashboard/stats`
pub fn router(state: Arc<ClinicState>) -> Router {
    Router::new()
        .route("/stats", get(stats))
        .with_state(DashboardService::new(state))
}

async fn stats(
    State(dashboard): State<DashboardService>,
    Tenant(tenant): Tenant,
) -> Result<Json<DashboardStats>, ClinicAxumError> {
    Ok(Json(dashboard.stats(&tenant).await?))
}
