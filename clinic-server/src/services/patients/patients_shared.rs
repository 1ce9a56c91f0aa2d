use clinic_core::{ServiceCapabilities, ServiceMethodKind, Statement};

use super::patients_schema::PatientInput;

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Get,
        ServiceMethodKind::Create,
        ServiceMethodKind::Update,
        ServiceMethodKind::Remove,
    ])
}

pub fn find_statement() -> Statement {
    Statement::rows("patients.find", "SELECT * FROM clients ORDER BY full_name")
}

pub fn get_statement(id: i64) -> Statement {
    Statement::rows("patients.get", "SELECT * FROM clients WHERE id = $1").bind(id)
}

fn bind_input(statement: Statement, input: &PatientInput) -> Statement {
    statement
        .bind(input.full_name())
        .bind(input.cpf.clone())
        .bind(input.birth_date)
        .bind(input.sex.clone())
        .bind(input.phone.clone())
        .bind(input.email.clone())
        .bind(input.zip_code.clone())
        .bind(input.street.clone())
        .bind(input.number.clone())
        .bind(input.complement.clone())
        .bind(input.neighborhood.clone())
        .bind(input.city.clone())
        .bind(input.state_uf())
        .bind(input.insurance_plan_id)
        .bind(input.is_active.unwrap_or(true))
}

pub fn insert_statement(input: &PatientInput) -> Statement {
    bind_input(
        Statement::rows(
            "patients.create",
            "INSERT INTO clients (full_name, cpf, birth_date, sex, phone, email, zip_code, street, number, \
             complement, neighborhood, city, state_uf, insurance_plan_id, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) RETURNING *",
        ),
        input,
    )
}

pub fn update_statement(id: i64, input: &PatientInput) -> Statement {
    bind_input(
        Statement::rows(
            "patients.update",
            "UPDATE clients SET full_name = $1, cpf = $2, birth_date = $3, sex = $4, phone = $5, email = $6, \
             zip_code = $7, street = $8, number = $9, complement = $10, neighborhood = $11, city = $12, \
             state_uf = $13, insurance_plan_id = $14, is_active = $15, updated_at = NOW() \
             WHERE id = $16 RETURNING *",
        ),
        input,
    )
    .bind(id)
}

pub fn delete_statement(id: i64) -> Statement {
    Statement::execute("patients.remove", "DELETE FROM clients WHERE id = $1").bind(id)
}
