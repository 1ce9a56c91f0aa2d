use serde::Deserialize;
use validator::Validate;

use crate::utils::fields::trimmed;

pub const ERROR_MESSAGE: &str = "Health insurances schema validation failed";

/// An insurance plan; `active` rather than `is_active` on this table.
#[derive(Debug, Deserialize, Validate)]
pub struct HealthInsuranceInput {
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name must not be empty")
    )]
    #[serde(default, deserialize_with = "trimmed")]
    pub name: Option<String>,

    pub active: Option<bool>,
}

impl HealthInsuranceInput {
    pub fn name(&self) -> String {
        self.name.clone().unwrap_or_default()
    }
}
