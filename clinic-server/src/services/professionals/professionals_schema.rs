use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::utils::fields::{blank_as_none, trimmed};
use crate::utils::validator::invalid;

pub const ERROR_MESSAGE: &str = "Professionals schema validation failed";

pub const AREAS: [&str; 3] = ["medico", "dentista", "exame"];

fn validate_area(area: &str) -> Result<(), ValidationError> {
    if AREAS.contains(&area) {
        Ok(())
    } else {
        Err(invalid("area", "area must be one of medico, dentista, exame"))
    }
}

/// Body of `POST /professionals` and `PUT /professionals/{id}`.
///
/// Extra fields sent back by the client (`id`, `specialtyName`, timestamps)
/// are ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfessionalInput {
    #[validate(
        required(message = "full_name is required"),
        length(min = 1, message = "full_name must not be empty")
    )]
    #[serde(default, deserialize_with = "trimmed")]
    pub full_name: Option<String>,

    #[validate(custom(function = "validate_area"))]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub area: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub specialty_id: Option<i64>,

    pub numero_conselho: Option<String>,

    #[validate(email(message = "email must be a valid email"))]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub email: Option<String>,

    pub phone: Option<String>,

    pub is_active: Option<bool>,
}

impl ProfessionalInput {
    pub fn full_name(&self) -> String {
        self.full_name.clone().unwrap_or_default()
    }
}
