use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clinic_core::{ClinicError, ClinicService, ServiceCapabilities, TenantContext};
use serde_json::Value;
use tracing::debug;

use crate::services::support::{deleted, one_row, uuid_id};
use crate::services::{ClinicParams, ClinicState};
use crate::utils::validator::validate;

use super::appointments_schema::{AppointmentInput, StatusInput, DEFAULT_STATUS, ERROR_MESSAGE};
use super::appointments_shared::{self, with_schedule_fields, STATUS_METHOD};
use super::AppointmentFilter;

pub struct AppointmentsService {
    pub state: Arc<ClinicState>,
}

impl AppointmentsService {
    async fn set_status(&self, ctx: &TenantContext, id: &str, data: &Value) -> Result<Value> {
        let key = uuid_id(id)?;
        let input: StatusInput = validate(data, ERROR_MESSAGE)?;
        let status = input.status.as_deref().unwrap_or(DEFAULT_STATUS);

        let result = self
            .state
            .run(ctx, appointments_shared::status_statement(key, status))
            .await?;
        debug!(tenant = %ctx.slug, appointment = %key, status, "appointment status changed");
        one_row(result, "Appointment", id).map(with_schedule_fields)
    }
}

#[async_trait]
impl ClinicService<Value, ClinicParams> for AppointmentsService {
    fn capabilities(&self) -> ServiceCapabilities {
        appointments_shared::capabilities()
    }

    async fn find(&self, ctx: &TenantContext, params: ClinicParams) -> Result<Vec<Value>> {
        let filter = AppointmentFilter::try_from(&params)?;
        let result = self
            .state
            .run(ctx, appointments_shared::find_statement(&filter))
            .await?;
        Ok(result.rows.into_iter().map(with_schedule_fields).collect())
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: ClinicParams) -> Result<Value> {
        let input: AppointmentInput = validate(&data, ERROR_MESSAGE)?;
        let result = self
            .state
            .run(ctx, appointments_shared::insert_statement(&input))
            .await?;
        one_row(result, "Appointment", "new").map(with_schedule_fields)
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        id: &str,
        data: Value,
        _params: ClinicParams,
    ) -> Result<Value> {
        let key = uuid_id(id)?;
        let input: AppointmentInput = validate(&data, ERROR_MESSAGE)?;
        let result = self
            .state
            .run(ctx, appointments_shared::update_statement(key, &input))
            .await?;
        one_row(result, "Appointment", id).map(with_schedule_fields)
    }

    async fn remove(&self, ctx: &TenantContext, id: &str, _params: ClinicParams) -> Result<Value> {
        let key = uuid_id(id)?;
        let result = self.state.run(ctx, appointments_shared::delete_statement(key)).await?;
        deleted(result, "Appointment", id)
    }

    async fn custom(
        &self,
        ctx: &TenantContext,
        method: &str,
        id: &str,
        data: Value,
        _params: ClinicParams,
    ) -> Result<Value> {
        match method {
            STATUS_METHOD => self.set_status(ctx, id, &data).await,
            _ => Err(ClinicError::method_not_allowed(format!("Method not implemented: {method}")).into_anyhow()),
        }
    }
}
