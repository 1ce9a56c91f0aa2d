use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use clinic_core::memory::{MemoryRegistry, MemorySource, MemorySourceOptions};
use clinic_core::{
    BoxError, ClinicApp, PooledExecutor, QueryResult, SqlParam, Statement, TenantRecord,
};
use clinic_server::{build_with, config, Backends};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const APPOINTMENT_ID: &str = "5a1d2a44-5b0c-4f59-8d0e-2b0a52f3c001";
const INSURANCE_ID: &str = "0f6c7a1e-93b4-4c1d-9d55-7e2f1b8a4c10";

/// Answers statements the way a seeded `clinic_cir` schema would.
fn clinic_db(schema: Option<&str>, stmt: &Statement) -> Result<QueryResult, BoxError> {
    if schema != Some("clinic_cir") {
        return Err(format!("relation \"professionals\" does not exist (search path {schema:?})").into());
    }

    let rows = match stmt.name() {
        "professionals.find" => vec![
            json!({"id": 1, "full_name": "Dra. Ana", "area": "medico", "specialtyName": "Clínica Geral"}),
            json!({"id": 2, "full_name": "Dr. Caio", "area": "dentista", "specialtyName": null}),
        ],
        "professionals.get" | "patients.get" => vec![],
        "professionals.remove" => {
            let affected = match stmt.params().first() {
                Some(SqlParam::Int(Some(1))) => 1,
                _ => 0,
            };
            return Ok(QueryResult::affected(affected));
        }
        "health_insurances.update" => match stmt.params().get(2) {
            Some(SqlParam::Text(Some(id))) if id == INSURANCE_ID => {
                vec![json!({"id": INSURANCE_ID, "name": "Unimed", "active": true})]
            }
            _ => vec![],
        },
        "patients.create" => vec![json!({"id": 10, "full_name": "Maria Souza", "is_active": true})],
        "appointments.find" => vec![json!({
            "id": APPOINTMENT_ID,
            "cliente_nome": "João",
            "inicio": "2025-03-10T12:30:00+00:00",
            "status": "waiting",
            "professionalName": "Dra. Ana"
        })],
        "appointments.status" => vec![json!({
            "id": APPOINTMENT_ID,
            "inicio": "2025-03-10T12:30:00+00:00",
            "status": "confirmed"
        })],
        "dashboard.appointments_today" => vec![json!({"count": 3})],
        "dashboard.patients_total" => vec![json!({"count": 42})],
        "dashboard.professionals_active" => vec![json!({"count": 5})],
        _ => vec![],
    };
    Ok(QueryResult::from_rows(rows))
}

struct Fixture {
    registry: Arc<MemoryRegistry>,
    source: MemorySource,
    router: Router,
}

fn fixture() -> Fixture {
    let registry = MemoryRegistry::new();
    registry.insert(TenantRecord::new("cir", "clinic_cir", "cir.painelagenda.com.br"));
    registry.insert(TenantRecord::new("lab", "clinic_lab", "lab.painelagenda.com.br"));
    let registry = Arc::new(registry);

    let source = MemorySource::new(MemorySourceOptions::default(), clinic_db);

    let app = ClinicApp::new();
    config::config_from(&app, |_| None).unwrap();
    let ax = build_with(
        app,
        Backends {
            registry: registry.clone(),
            executor: Arc::new(PooledExecutor::new(source.clone())),
        },
    )
    .unwrap();

    Fixture {
        registry,
        source,
        router: ax.into_router(),
    }
}

async fn call(
    router: &Router,
    method: &str,
    uri: &str,
    tenant: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(slug) = tenant {
        req = req.header("x-tenant-slug", slug);
    }
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let res = router.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status().as_u16();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()));
    (status, body)
}

#[tokio::test]
async fn cir_lists_professionals_from_its_own_schema() {
    let fx = fixture();

    let (status, body) = call(&fx.router, "GET", "/api/professionals", Some("cir"), None).await;
    assert_eq!(status, 200);
    assert_eq!(body[0]["full_name"], "Dra. Ana");
    assert_eq!(body[0]["specialtyName"], "Clínica Geral");

    assert_eq!(
        fx.source.statements(),
        vec![(Some("clinic_cir".to_string()), "professionals.find".to_string())]
    );
    assert_eq!(fx.source.acquires(), fx.source.releases());
    assert!(fx.source.idle_search_paths().iter().all(Option::is_none));
}

#[tokio::test]
async fn unknown_tenant_is_404_and_missing_header_never_reaches_the_registry() {
    let fx = fixture();

    let (status, body) = call(&fx.router, "GET", "/api/professionals", Some("nope"), None).await;
    assert_eq!(status, 404);
    assert_eq!(body["className"], "tenant-not-found");
    assert_eq!(fx.registry.calls(), 1);

    let (status, body) = call(&fx.router, "GET", "/api/professionals", None, None).await;
    assert_eq!(status, 400);
    assert_eq!(body["className"], "missing-tenant");
    assert_eq!(fx.registry.calls(), 1);

    assert!(fx.source.statements().is_empty());
}

#[tokio::test]
async fn tenant_describes_itself() {
    let fx = fixture();

    let (status, body) = call(&fx.router, "GET", "/api/tenant", Some("cir"), None).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "slug": "cir",
            "schema_name": "clinic_cir",
            "primary_domain": "cir.painelagenda.com.br"
        })
    );
}

#[tokio::test]
async fn health_needs_no_tenant() {
    let fx = fixture();
    let (status, body) = call(&fx.router, "GET", "/health", None, None).await;
    assert_eq!(status, 200);
    assert_eq!(body, Value::String("ok".into()));
    assert_eq!(fx.registry.calls(), 0);
}

#[tokio::test]
async fn creating_a_patient_returns_201() {
    let fx = fixture();

    let (status, body) = call(
        &fx.router,
        "POST",
        "/api/patients",
        Some("cir"),
        Some(json!({"full_name": "Maria Souza", "birth_date": "", "email": "maria@example.com"})),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["id"], 10);
}

#[tokio::test]
async fn invalid_patient_is_422_with_field_errors() {
    let fx = fixture();

    let (status, body) = call(
        &fx.router,
        "POST",
        "/api/patients",
        Some("cir"),
        Some(json!({"full_name": "", "email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(body["className"], "unprocessable");
    assert_eq!(body["errors"]["full_name"], json!(["full_name must not be empty"]));
    assert_eq!(body["errors"]["email"], json!(["email must be a valid email"]));
    assert!(fx.source.statements().is_empty());
}

#[tokio::test]
async fn whitespace_only_names_are_422_before_any_statement() {
    let fx = fixture();

    let (status, body) =
        call(&fx.router, "POST", "/api/patients", Some("cir"), Some(json!({"full_name": "   "}))).await;
    assert_eq!(status, 422);
    assert_eq!(body["errors"]["full_name"], json!(["full_name must not be empty"]));
    assert!(fx.source.statements().is_empty());
}

#[tokio::test]
async fn health_insurances_are_updated_by_uuid_or_serial_id() {
    let fx = fixture();

    let uri = format!("/api/health-insurances/{INSURANCE_ID}");
    let (status, body) =
        call(&fx.router, "PUT", &uri, Some("cir"), Some(json!({"name": " Unimed ", "active": true}))).await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], INSURANCE_ID);

    let (status, body) =
        call(&fx.router, "PUT", "/api/health-insurances/3", Some("cir"), Some(json!({"name": "Amil"}))).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Health insurance not found: 3");
}

#[tokio::test]
async fn missing_records_are_404_and_deletes_are_204() {
    let fx = fixture();

    let (status, body) = call(&fx.router, "GET", "/api/patients/77", Some("cir"), None).await;
    assert_eq!(status, 404);
    assert_eq!(body["className"], "not-found");

    let (status, _) = call(&fx.router, "DELETE", "/api/professionals/1", Some("cir"), None).await;
    assert_eq!(status, 204);

    let (status, _) = call(&fx.router, "DELETE", "/api/professionals/2", Some("cir"), None).await;
    assert_eq!(status, 404);

    let (status, body) = call(&fx.router, "GET", "/api/professionals/abc", Some("cir"), None).await;
    assert_eq!(status, 400);
    assert_eq!(body["className"], "bad-request");
}

#[tokio::test]
async fn appointments_carry_utc_date_and_time() {
    let fx = fixture();

    let (status, body) = call(
        &fx.router,
        "GET",
        "/api/appointments?date=2025-03-10&professional_id=1",
        Some("cir"),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body[0]["date"], "2025-03-10");
    assert_eq!(body[0]["time"], "12:30");
    assert_eq!(body[0]["professionalName"], "Dra. Ana");

    let (status, _) = call(
        &fx.router,
        "GET",
        "/api/appointments?professional_id=ana",
        Some("cir"),
        None,
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn appointment_status_is_patched_through_its_own_route() {
    let fx = fixture();
    let uri = format!("/api/appointments/{APPOINTMENT_ID}/status");

    let (status, body) = call(&fx.router, "PATCH", &uri, Some("cir"), Some(json!({"status": "confirmed"}))).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["time"], "12:30");

    let (status, body) = call(&fx.router, "PATCH", &uri, Some("cir"), Some(json!({"status": "cancelled"}))).await;
    assert_eq!(status, 422);
    assert!(body["errors"]["status"].is_array());
}

#[tokio::test]
async fn specialties_cannot_be_deleted() {
    let fx = fixture();
    let (status, _) = call(&fx.router, "DELETE", "/api/specialties/1", Some("cir"), None).await;
    assert_eq!(status, 405);
}

#[tokio::test]
async fn dashboard_reports_counts_and_wait_time() {
    let fx = fixture();

    let (status, body) = call(&fx.router, "GET", "/api/dashboard/stats", Some("cir"), None).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "appointments_today": 3,
            "patients_total": 42,
            "professionals_active": 5,
            "avg_wait_time": "15min"
        })
    );
    assert_eq!(fx.source.acquires(), 3);
    assert_eq!(fx.source.releases(), 3);
}

#[tokio::test]
async fn messages_filters_reach_the_statement() {
    let fx = fixture();

    let (status, body) = call(
        &fx.router,
        "GET",
        "/api/messages?phone=(11)%2098765&direction=received&limit=9999",
        Some("cir"),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, json!([]));

    let (status, _) = call(&fx.router, "GET", "/api/messages?direction=both", Some("cir"), None).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn statement_failures_name_the_statement_not_the_sql() {
    let fx = fixture();

    let (status, body) = call(&fx.router, "GET", "/api/professionals", Some("lab"), None).await;
    assert_eq!(status, 500);
    assert_eq!(body["className"], "statement-failed");
    assert_eq!(body["data"], json!({"statement": "professionals.find"}));
    assert!(!body.to_string().contains("SELECT"));
    assert_eq!(fx.source.acquires(), fx.source.releases());
}
