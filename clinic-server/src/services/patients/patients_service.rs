use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clinic_core::{ClinicService, ServiceCapabilities, TenantContext};
use serde_json::Value;

use crate::services::support::{deleted, int_id, one_row};
use crate::services::{ClinicParams, ClinicState};
use crate::utils::validator::validate;

use super::patients_schema::{PatientInput, ERROR_MESSAGE};
use super::patients_shared;

pub struct PatientsService {
    pub state: Arc<ClinicState>,
}

#[async_trait]
impl ClinicService<Value, ClinicParams> for PatientsService {
    fn capabilities(&self) -> ServiceCapabilities {
        patients_shared::capabilities()
    }

    async fn find(&self, ctx: &TenantContext, _params: ClinicParams) -> Result<Vec<Value>> {
        let result = self.state.run(ctx, patients_shared::find_statement()).await?;
        Ok(result.rows)
    }

    async fn get(&self, ctx: &TenantContext, id: &str, _params: ClinicParams) -> Result<Value> {
        let key = int_id(id)?;
        let result = self.state.run(ctx, patients_shared::get_statement(key)).await?;
        one_row(result, "Patient", id)
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: ClinicParams) -> Result<Value> {
        let input: PatientInput = validate(&data, ERROR_MESSAGE)?;
        let result = self
            .state
            .run(ctx, patients_shared::insert_statement(&input))
            .await?;
        one_row(result, "Patient", "new")
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        id: &str,
        data: Value,
        _params: ClinicParams,
    ) -> Result<Value> {
        let key = int_id(id)?;
        let input: PatientInput = validate(&data, ERROR_MESSAGE)?;
        let result = self
            .state
            .run(ctx, patients_shared::update_statement(key, &input))
            .await?;
        one_row(result, "Patient", id)
    }

    async fn remove(&self, ctx: &TenantContext, id: &str, _params: ClinicParams) -> Result<Value> {
        let key = int_id(id)?;
        let result = self.state.run(ctx, patients_shared::delete_statement(key)).await?;
        deleted(result, "Patient", id)
    }
}
