use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clinic_core::{ClinicService, ServiceCapabilities, TenantContext};
use serde_json::Value;

use crate::services::support::{one_row, text_id};
use crate::services::{ClinicParams, ClinicState};
use crate::utils::validator::validate;

use super::health_insurances_schema::{HealthInsuranceInput, ERROR_MESSAGE};
use super::health_insurances_shared;

pub struct HealthInsurancesService {
    pub state: Arc<ClinicState>,
}

#[async_trait]
impl ClinicService<Value, ClinicParams> for HealthInsurancesService {
    fn capabilities(&self) -> ServiceCapabilities {
        health_insurances_shared::capabilities()
    }

    async fn find(&self, ctx: &TenantContext, _params: ClinicParams) -> Result<Vec<Value>> {
        Ok(self.state.run(ctx, health_insurances_shared::find_statement()).await?.rows)
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: ClinicParams) -> Result<Value> {
        let input: HealthInsuranceInput = validate(&data, ERROR_MESSAGE)?;
        let result = self.state.run(ctx, health_insurances_shared::insert_statement(&input)).await?;
        one_row(result, "Health insurance", "new")
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        id: &str,
        data: Value,
        _params: ClinicParams,
    ) -> Result<Value> {
        let key = text_id(id)?;
        let input: HealthInsuranceInput = validate(&data, ERROR_MESSAGE)?;
        let result = self
            .state
            .run(ctx, health_insurances_shared::update_statement(&key, &input))
            .await?;
        one_row(result, "Health insurance", &key)
    }
}
