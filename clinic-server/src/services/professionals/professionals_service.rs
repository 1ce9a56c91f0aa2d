use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clinic_core::{ClinicService, ServiceCapabilities, TenantContext};
use serde_json::Value;

use crate::services::support::{deleted, int_id, one_row};
use crate::services::{ClinicParams, ClinicState};
use crate::utils::validator::validate;

use super::professionals_schema::{ProfessionalInput, ERROR_MESSAGE};
use super::professionals_shared;

pub struct ProfessionalsService {
    pub state: Arc<ClinicState>,
}

#[async_trait]
impl ClinicService<Value, ClinicParams> for ProfessionalsService {
    fn capabilities(&self) -> ServiceCapabilities {
        professionals_shared::capabilities()
    }

    async fn find(&self, ctx: &TenantContext, _params: ClinicParams) -> Result<Vec<Value>> {
        let result = self.state.run(ctx, professionals_shared::find_statement()).await?;
        Ok(result.rows)
    }

    async fn get(&self, ctx: &TenantContext, id: &str, _params: ClinicParams) -> Result<Value> {
        let key = int_id(id)?;
        let result = self.state.run(ctx, professionals_shared::get_statement(key)).await?;
        one_row(result, "Professional", id)
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: ClinicParams) -> Result<Value> {
        let input: ProfessionalInput = validate(&data, ERROR_MESSAGE)?;
        let result = self
            .state
            .run(ctx, professionals_shared::insert_statement(&input))
            .await?;
        one_row(result, "Professional", "new")
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        id: &str,
        data: Value,
        _params: ClinicParams,
    ) -> Result<Value> {
        let key = int_id(id)?;
        let input: ProfessionalInput = validate(&data, ERROR_MESSAGE)?;
        let result = self
            .state
            .run(ctx, professionals_shared::update_statement(key, &input))
            .await?;
        one_row(result, "Professional", id)
    }

    async fn remove(&self, ctx: &TenantContext, id: &str, _params: ClinicParams) -> Result<Value> {
        let key = int_id(id)?;
        let result = self.state.run(ctx, professionals_shared::delete_statement(key)).await?;
        deleted(result, "Professional", id)
    }
}
