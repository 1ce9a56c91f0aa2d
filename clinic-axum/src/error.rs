use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clinic_core::{ClinicError, TenancyError};

#[derive(Debug)]
pub struct ClinicAxumError(pub anyhow::Error);

impl From<anyhow::Error> for ClinicAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<ClinicError> for ClinicAxumError {
    fn from(e: ClinicError) -> Self {
        Self(e.into_anyhow())
    }
}

impl From<TenancyError> for ClinicAxumError {
    fn from(e: TenancyError) -> Self {
        ClinicError::from(e).into()
    }
}

impl IntoResponse for ClinicAxumError {
    fn into_response(self) -> Response {
        let detail = format!("{:#}", self.0);

        // A ClinicError wrapped in anyhow contexts keeps its Feathers-ish fields
        let found = ClinicError::from_anyhow(&self.0).map(ClinicError::sanitize_for_client);
        let safe = found.unwrap_or_else(|| ClinicError::normalize(self.0).sanitize_for_client());

        let status =
            StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(kind = safe.class_name(), error = %detail, "request failed");
        }
        (status, Json(safe.to_json())).into_response()
    }
}
