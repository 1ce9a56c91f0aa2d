use std::sync::Arc;

use anyhow::Result;
use clinic_core::{QueryResult, ScopedExecutor, Statement, TenantContext};

pub type ClinicParams = clinic_axum::params::RestParams;

/// What every clinic service shares.
pub struct ClinicState {
    pub executor: Arc<dyn ScopedExecutor>,
    pub avg_wait_time: String,
}

impl ClinicState {
    pub fn new(executor: Arc<dyn ScopedExecutor>) -> Self {
        Self {
            executor,
            avg_wait_time: "15min".to_string(),
        }
    }

    pub fn with_avg_wait_time(mut self, avg_wait_time: impl Into<String>) -> Self {
        self.avg_wait_time = avg_wait_time.into();
        self
    }

    /// Run one statement inside the tenant's schema.
    pub async fn run(&self, ctx: &TenantContext, statement: Statement) -> Result<QueryResult> {
        Ok(self.executor.run_scoped(&ctx.schema, &statement).await?)
    }
}
