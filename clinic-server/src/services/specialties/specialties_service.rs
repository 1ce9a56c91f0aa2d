use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clinic_core::{ClinicService, ServiceCapabilities, TenantContext};
use serde_json::Value;

use crate::services::support::{int_id, one_row};
use crate::services::{ClinicParams, ClinicState};
use crate::utils::validator::validate;

use super::specialties_schema::{SpecialtyInput, ERROR_MESSAGE};
use super::specialties_shared;

pub struct SpecialtiesService {
    pub state: Arc<ClinicState>,
}

#[async_trait]
impl ClinicService<Value, ClinicParams> for SpecialtiesService {
    fn capabilities(&self) -> ServiceCapabilities {
        specialties_shared::capabilities()
    }

    async fn find(&self, ctx: &TenantContext, _params: ClinicParams) -> Result<Vec<Value>> {
        Ok(self.state.run(ctx, specialties_shared::find_statement()).await?.rows)
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: ClinicParams) -> Result<Value> {
        let input: SpecialtyInput = validate(&data, ERROR_MESSAGE)?;
        let result = self.state.run(ctx, specialties_shared::insert_statement(&input)).await?;
        one_row(result, "Specialty", "new")
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        id: &str,
        data: Value,
        _params: ClinicParams,
    ) -> Result<Value> {
        let key = int_id(id)?;
        let input: SpecialtyInput = validate(&data, ERROR_MESSAGE)?;
        let result = self
            .state
            .run(ctx, specialties_shared::update_statement(key, &input))
            .await?;
        one_row(result, "Specialty", id)
    }
}
