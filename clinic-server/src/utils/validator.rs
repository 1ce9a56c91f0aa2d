use std::borrow::Cow;

use clinic_core::ClinicError;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

fn friendly_message(code: &str) -> Option<&'static str> {
    match code {
        "required" => Some("is required"),
        "email" => Some("must be a valid email"),
        "length" => Some("has invalid length"),
        "range" => Some("is out of range"),
        _ => None,
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    // struct-level checks report under `__all__`
    let field = if field == "__all__" { "_schema" } else { field };
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn push_field(out: &mut Map<String, Value>, key: &str, msg: String) {
    let entry = out
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(list) = entry {
        list.push(Value::String(msg));
    }
}

fn push_validation_errors(out: &mut Map<String, Value>, prefix: &str, errs: &ValidationErrors) {
    for (field, kind) in errs.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let key = join_path(prefix, field);
                for e in field_errors {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .or_else(|| friendly_message(&e.code).map(|m| format!("{key} {m}")))
                        .unwrap_or_else(|| e.code.to_string());
                    push_field(out, &key, msg);
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                push_validation_errors(out, &join_path(prefix, field), nested.as_ref());
            }
            ValidationErrorsKind::List(list) => {
                let base = join_path(prefix, field);
                for (idx, nested) in list {
                    push_validation_errors(out, &format!("{base}[{idx}]"), nested.as_ref());
                }
            }
        }
    }
}

/// `{ "field": ["message", ...] }`
pub fn field_errors(errs: &ValidationErrors) -> Value {
    let mut out = Map::new();
    push_validation_errors(&mut out, "", errs);
    Value::Object(out)
}

/// Parse and validate a request body, or fail with a 422 carrying per-field errors.
pub fn validate<T>(data: &Value, error_message: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(data.clone()).map_err(|e| {
        ClinicError::unprocessable(error_message)
            .with_errors(json!({"_schema": [e.to_string()]}))
            .into_anyhow()
    })?;

    parsed.validate().map_err(|e| {
        ClinicError::unprocessable(error_message)
            .with_errors(field_errors(&e))
            .into_anyhow()
    })?;

    Ok(parsed)
}

/// Custom-validator error with a fixed message.
pub fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::ErrorKind;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Named {
        #[validate(length(min = 1, message = "name must not be empty"))]
        name: String,
        #[validate(email)]
        email: Option<String>,
    }

    #[test]
    fn field_errors_are_grouped_by_field() {
        let err = validate::<Named>(&json!({"name": "", "email": "nope"}), "Invalid").unwrap_err();
        let clinic = ClinicError::normalize(err);
        assert_eq!(clinic.kind, ErrorKind::Unprocessable);

        let errors = clinic.errors.unwrap();
        assert_eq!(errors["name"], json!(["name must not be empty"]));
        assert_eq!(errors["email"], json!(["email must be a valid email"]));
    }

    #[test]
    fn shape_errors_land_under_schema() {
        let err = validate::<Named>(&json!({"email": "a@b.co"}), "Invalid").unwrap_err();
        let clinic = ClinicError::normalize(err);
        let errors = clinic.errors.unwrap();
        assert!(errors["_schema"][0].as_str().unwrap().contains("name"));
    }
}
