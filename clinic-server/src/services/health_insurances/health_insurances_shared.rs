use clinic_core::{ServiceCapabilities, ServiceMethodKind, Statement};

use super::health_insurances_schema::HealthInsuranceInput;

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Create,
        ServiceMethodKind::Update,
    ])
}

pub fn find_statement() -> Statement {
    Statement::rows("health_insurances.find", "SELECT * FROM health_insurances ORDER BY name")
}

pub fn insert_statement(input: &HealthInsuranceInput) -> Statement {
    Statement::rows(
        "health_insurances.create",
        "INSERT INTO health_insurances (name, active) VALUES ($1, $2) RETURNING *",
    )
    .bind(input.name())
    .bind(input.active.unwrap_or(true))
}

/// Plan ids are matched as text: a serial key and a uuid key both compare.
pub fn update_statement(id: &str, input: &HealthInsuranceInput) -> Statement {
    Statement::rows(
        "health_insurances.update",
        "UPDATE health_insurances SET name = $1, active = $2 WHERE id::text = $3 RETURNING *",
    )
    .bind(input.name())
    .bind(input.active.unwrap_or(true))
    .bind(id)
}
