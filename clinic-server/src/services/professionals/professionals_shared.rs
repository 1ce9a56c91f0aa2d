use clinic_core::{ServiceCapabilities, ServiceMethodKind, Statement};

use super::professionals_schema::ProfessionalInput;

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Get,
        ServiceMethodKind::Create,
        ServiceMethodKind::Update,
        ServiceMethodKind::Remove,
    ])
}

const SELECT: &str = r#"SELECT p.*, s.name AS "specialtyName" FROM professionals p LEFT JOIN specialties s ON s.id = p.specialty_id"#;

pub fn find_statement() -> Statement {
    Statement::rows("professionals.find", format!("{SELECT} ORDER BY p.full_name"))
}

pub fn get_statement(id: i64) -> Statement {
    Statement::rows("professionals.get", format!("{SELECT} WHERE p.id = $1")).bind(id)
}

fn bind_input(statement: Statement, input: &ProfessionalInput) -> Statement {
    statement
        .bind(input.full_name())
        .bind(input.area.clone())
        .bind(input.specialty_id)
        .bind(input.numero_conselho.clone())
        .bind(input.email.clone())
        .bind(input.phone.clone())
        .bind(input.is_active.unwrap_or(true))
}

pub fn insert_statement(input: &ProfessionalInput) -> Statement {
    bind_input(
        Statement::rows(
            "professionals.create",
            "INSERT INTO professionals (full_name, area, specialty_id, numero_conselho, email, phone, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        ),
        input,
    )
}

pub fn update_statement(id: i64, input: &ProfessionalInput) -> Statement {
    bind_input(
        Statement::rows(
            "professionals.update",
            "UPDATE professionals SET full_name = $1, area = $2, specialty_id = $3, numero_conselho = $4, \
             email = $5, phone = $6, is_active = $7, updated_at = NOW() WHERE id = $8 RETURNING *",
        ),
        input,
    )
    .bind(id)
}

pub fn delete_statement(id: i64) -> Statement {
    Statement::execute("professionals.remove", "DELETE FROM professionals WHERE id = $1").bind(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::SqlParam;
    use serde_json::json;

    #[test]
    fn list_joins_specialty_name_and_orders_by_name() {
        let stmt = find_statement();
        assert!(stmt.sql().contains(r#"s.name AS "specialtyName""#));
        assert!(stmt.sql().ends_with("ORDER BY p.full_name"));
    }

    #[test]
    fn insert_defaults_to_active() {
        let input: ProfessionalInput = serde_json::from_value(json!({"full_name": " Dr. Caio "})).unwrap();
        let stmt = insert_statement(&input);
        assert_eq!(stmt.params()[0], SqlParam::Text(Some("Dr. Caio".into())));
        assert_eq!(stmt.params()[6], SqlParam::Bool(Some(true)));
    }

    #[test]
    fn update_binds_id_last() {
        let input: ProfessionalInput =
            serde_json::from_value(json!({"full_name": "Dr. Caio", "is_active": false})).unwrap();
        let stmt = update_statement(8, &input);
        assert!(stmt.sql().contains("updated_at = NOW()"));
        assert_eq!(stmt.params()[6], SqlParam::Bool(Some(false)));
        assert_eq!(stmt.params()[7], SqlParam::Int(Some(8)));
    }
}
