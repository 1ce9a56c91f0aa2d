use clinic_core::{ServiceCapabilities, ServiceMethodKind, Statement};
use serde_json::Value;
use uuid::Uuid;

use crate::services::support::Conditions;
use crate::utils::fields::parse_timestamp;

use super::appointments_schema::AppointmentInput;
use super::AppointmentFilter;

pub const STATUS_METHOD: &str = "status";

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Create,
        ServiceMethodKind::Update,
        ServiceMethodKind::Remove,
        ServiceMethodKind::Custom(STATUS_METHOD),
    ])
}

const SELECT: &str = r#"SELECT a.*, p.full_name AS "professionalName" FROM appointments a LEFT JOIN professionals p ON p.id = a.professional_id"#;

pub fn find_statement(filter: &AppointmentFilter) -> Statement {
    let mut conds = Conditions::new();
    if let Some(date) = filter.date {
        conds.push("(a.inicio AT TIME ZONE 'UTC')::date = {}", date);
    }
    if let Some(professional_id) = filter.professional_id {
        conds.push("a.professional_id = {}", professional_id);
    }
    let sql = format!("{SELECT}{} ORDER BY a.inicio", conds.where_clause());
    conds.into_statement("appointments.find", sql)
}

fn bind_input(statement: Statement, input: &AppointmentInput) -> Statement {
    statement
        .bind(input.cliente_nome())
        .bind(input.cliente_telefone.clone())
        .bind(input.tipo.clone())
        .bind(input.inicio)
        .bind(input.fim)
        .bind(input.status())
        .bind(input.observacao.clone())
        .bind(input.professional_id)
        .bind(input.service_id)
}

pub fn insert_statement(input: &AppointmentInput) -> Statement {
    bind_input(
        Statement::rows(
            "appointments.create",
            "INSERT INTO appointments (cliente_nome, cliente_telefone, tipo, inicio, fim, status, observacao, \
             professional_id, service_id) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        ),
        input,
    )
}

pub fn update_statement(id: Uuid, input: &AppointmentInput) -> Statement {
    bind_input(
        Statement::rows(
            "appointments.update",
            "UPDATE appointments SET cliente_nome = $1, cliente_telefone = $2, tipo = $3, inicio = $4, fim = $5, \
             status = $6, observacao = $7, professional_id = $8, service_id = $9, updated_at = NOW() \
             WHERE id = $10 RETURNING *",
        ),
        input,
    )
    .bind(id)
}

pub fn status_statement(id: Uuid, status: &str) -> Statement {
    Statement::rows(
        "appointments.status",
        "UPDATE appointments SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(status)
    .bind(id)
}

pub fn delete_statement(id: Uuid) -> Statement {
    Statement::execute("appointments.remove", "DELETE FROM appointments WHERE id = $1").bind(id)
}

/// Add `date` (`YYYY-MM-DD`) and `time` (`HH:MM`) of `inicio`, in UTC.
///
/// Both are empty strings when `inicio` is null or unparseable.
pub fn with_schedule_fields(mut row: Value) -> Value {
    let inicio = row
        .get("inicio")
        .and_then(Value::as_str)
        .and_then(parse_timestamp);

    if let Some(obj) = row.as_object_mut() {
        let (date, time) = match inicio {
            Some(ts) => (ts.format("%Y-%m-%d").to_string(), ts.format("%H:%M").to_string()),
            None => (String::new(), String::new()),
        };
        obj.insert("date".to_string(), Value::String(date));
        obj.insert("time".to_string(), Value::String(time));
    }
    row
}
