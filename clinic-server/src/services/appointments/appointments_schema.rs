use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::utils::fields::{blank_as_none, timestamp, trimmed};
use crate::utils::validator::invalid;

pub const ERROR_MESSAGE: &str = "Appointments schema validation failed";

pub const STATUSES: [&str; 6] = ["waiting", "confirmed", "queue", "in-progress", "completed", "absent"];

pub const DEFAULT_STATUS: &str = "waiting";

fn validate_status(status: &str) -> Result<(), ValidationError> {
    if STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(invalid(
            "status",
            "status must be one of waiting, confirmed, queue, in-progress, completed, absent",
        ))
    }
}

fn validate_window(input: &AppointmentInput) -> Result<(), ValidationError> {
    match (input.inicio, input.fim) {
        (Some(inicio), Some(fim)) if fim < inicio => {
            Err(invalid("window", "fim must not be before inicio"))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_window"))]
pub struct AppointmentInput {
    #[validate(
        required(message = "cliente_nome is required"),
        length(min = 1, message = "cliente_nome must not be empty")
    )]
    #[serde(default, deserialize_with = "trimmed")]
    pub cliente_nome: Option<String>,

    pub cliente_telefone: Option<String>,

    pub tipo: Option<String>,

    #[validate(required(message = "inicio is required"))]
    #[serde(default, deserialize_with = "timestamp")]
    pub inicio: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "timestamp")]
    pub fim: Option<DateTime<Utc>>,

    #[validate(custom(function = "validate_status"))]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<String>,

    pub observacao: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub professional_id: Option<i64>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub service_id: Option<i64>,
}

impl AppointmentInput {
    pub fn cliente_nome(&self) -> String {
        self.cliente_nome.clone().unwrap_or_default()
    }

    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or(DEFAULT_STATUS)
    }
}

/// Body of `PATCH /appointments/{id}/status`.
#[derive(Debug, Deserialize, Validate)]
pub struct StatusInput {
    #[validate(required(message = "status is required"), custom(function = "validate_status"))]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validator::validate;
    use clinic_core::ClinicError;
    use serde_json::json;

    #[test]
    fn status_defaults_to_waiting() {
        let input: AppointmentInput = validate(
            &json!({"cliente_nome": "João", "inicio": "2025-03-10T09:00:00Z", "status": ""}),
            ERROR_MESSAGE,
        )
        .unwrap();
        assert_eq!(input.status(), "waiting");
    }

    #[test]
    fn end_before_start_is_a_schema_error() {
        let err = validate::<AppointmentInput>(
            &json!({
                "cliente_nome": "João",
                "inicio": "2025-03-10T10:00:00Z",
                "fim": "2025-03-10T09:00:00Z"
            }),
            ERROR_MESSAGE,
        )
        .unwrap_err();
        let errors = ClinicError::normalize(err).errors.unwrap();
        assert_eq!(errors["_schema"], json!(["fim must not be before inicio"]));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = validate::<StatusInput>(&json!({"status": "cancelled"}), ERROR_MESSAGE).unwrap_err();
        let errors = ClinicError::normalize(err).errors.unwrap();
        assert!(errors["status"][0].as_str().unwrap().starts_with("status must be one of"));

        let err = validate::<StatusInput>(&json!({}), ERROR_MESSAGE).unwrap_err();
        let errors = ClinicError::normalize(err).errors.unwrap();
        assert_eq!(errors["status"], json!(["status is required"]));
    }

    #[test]
    fn whitespace_only_client_name_is_empty() {
        let err = validate::<AppointmentInput>(
            &json!({"cliente_nome": "  ", "inicio": "2025-03-10T09:00:00Z"}),
            ERROR_MESSAGE,
        )
        .unwrap_err();
        let errors = ClinicError::normalize(err).errors.unwrap();
        assert_eq!(errors["cliente_nome"], json!(["cliente_nome must not be empty"]));
    }
}
