use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clinic_core::{Statement, TenantContext};
use serde::Serialize;
use serde_json::Value;

use crate::services::ClinicState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub appointments_today: i64,
    pub patients_total: i64,
    pub professionals_active: i64,
    pub avg_wait_time: String,
}

pub fn appointments_today_statement(today: NaiveDate) -> Statement {
    Statement::rows(
        "dashboard.appointments_today",
        "SELECT COUNT(*) AS count FROM appointments WHERE (inicio AT TIME ZONE 'UTC')::date = $1",
    )
    .bind(today)
}

pub fn patients_total_statement() -> Statement {
    Statement::rows(
        "dashboard.patients_total",
        "SELECT COUNT(*) AS count FROM clients WHERE is_active = true",
    )
}

pub fn professionals_active_statement() -> Statement {
    Statement::rows(
        "dashboard.professionals_active",
        "SELECT COUNT(*) AS count FROM professionals WHERE is_active = true",
    )
}

/// Headline counts for the tenant's dashboard.
#[derive(Clone)]
pub struct DashboardService {
    state: Arc<ClinicState>,
}

impl DashboardService {
    pub fn new(state: Arc<ClinicState>) -> Self {
        Self { state }
    }

    async fn count(&self, ctx: &TenantContext, statement: Statement) -> Result<i64> {
        let result = self.state.run(ctx, statement).await?;
        Ok(result
            .first()
            .and_then(|row| row.get("count"))
            .and_then(Value::as_i64)
            .unwrap_or(0))
    }

    /// The three counts run concurrently, each on its own pooled connection.
    pub async fn stats(&self, ctx: &TenantContext) -> Result<DashboardStats> {
        let today = Utc::now().date_naive();
        let (appointments_today, patients_total, professionals_active) = futures::try_join!(
            self.count(ctx, appointments_today_statement(today)),
            self.count(ctx, patients_total_statement()),
            self.count(ctx, professionals_active_statement()),
        )?;

        Ok(DashboardStats {
            appointments_today,
            patients_total,
            professionals_active,
            avg_wait_time: self.state.avg_wait_time.clone(),
        })
    }
}
