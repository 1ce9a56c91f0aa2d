use clinic_core::{ServiceCapabilities, ServiceMethodKind, Statement};

use super::specialties_schema::SpecialtyInput;

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Create,
        ServiceMethodKind::Update,
    ])
}

pub fn find_statement() -> Statement {
    Statement::rows("specialties.find", "SELECT * FROM specialties ORDER BY name")
}

pub fn insert_statement(input: &SpecialtyInput) -> Statement {
    Statement::rows(
        "specialties.create",
        "INSERT INTO specialties (name, is_active) VALUES ($1, $2) RETURNING *",
    )
    .bind(input.name())
    .bind(input.is_active.unwrap_or(true))
}

pub fn update_statement(id: i64, input: &SpecialtyInput) -> Statement {
    Statement::rows(
        "specialties.update",
        "UPDATE specialties SET name = $1, is_active = $2 WHERE id = $3 RETURNING *",
    )
    .bind(input.name())
    .bind(input.is_active.unwrap_or(true))
    .bind(id)
}
