use chrono::NaiveDate;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::utils::fields::{blank_as_none, trimmed};
use crate::utils::validator::invalid;

pub const ERROR_MESSAGE: &str = "Patients schema validation failed";

fn validate_state_uf(uf: &str) -> Result<(), ValidationError> {
    if uf.len() == 2 && uf.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(invalid("state_uf", "state_uf must have two letters"))
    }
}

/// A patient record as stored in `clients`.
#[derive(Debug, Deserialize, Validate)]
pub struct PatientInput {
    #[validate(
        required(message = "full_name is required"),
        length(min = 1, message = "full_name must not be empty")
    )]
    #[serde(default, deserialize_with = "trimmed")]
    pub full_name: Option<String>,

    pub cpf: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub birth_date: Option<NaiveDate>,

    pub sex: Option<String>,
    pub phone: Option<String>,

    #[validate(email(message = "email must be a valid email"))]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub email: Option<String>,

    pub zip_code: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,

    #[validate(custom(function = "validate_state_uf"))]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub state_uf: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub insurance_plan_id: Option<i64>,

    pub is_active: Option<bool>,
}

impl PatientInput {
    pub fn full_name(&self) -> String {
        self.full_name.clone().unwrap_or_default()
    }

    pub fn state_uf(&self) -> Option<String> {
        self.state_uf.as_ref().map(|uf| uf.to_ascii_uppercase())
    }
}
