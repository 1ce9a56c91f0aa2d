use serde::Deserialize;
use validator::Validate;

use crate::utils::fields::trimmed;

pub const ERROR_MESSAGE: &str = "Specialties schema validation failed";

#[derive(Debug, Deserialize, Validate)]
pub struct SpecialtyInput {
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name must not be empty")
    )]
    #[serde(default, deserialize_with = "trimmed")]
    pub name: Option<String>,

    pub is_active: Option<bool>,
}

impl SpecialtyInput {
    pub fn name(&self) -> String {
        self.name.clone().unwrap_or_default()
    }
}
