use std::sync::Arc;

use axum::body::Body;
use axum::http::HeaderValue;
use axum::http::Request;
use clinic_axum::{axum, TenantMiddleware};
use clinic_core::memory::MemoryRegistry;
use clinic_core::{
    ClinicApp, ClinicError, ClinicService, ServiceCapabilities, ServiceMethodKind, TenancyError,
    TenantContext, TenantRecord, TenantResolver,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

struct UnprocessableOnCreate;

#[async_trait::async_trait]
impl ClinicService<Value, ()> for UnprocessableOnCreate {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create])
    }

    async fn create(&self, _ctx: &TenantContext, _data: Value, _params: ()) -> anyhow::Result<Value> {
        Err(ClinicError::unprocessable("Invalid")
            .with_errors(json!({"full_name": ["full_name is required"]}))
            .into_anyhow())
    }
}

struct BoomOnCreate;

#[async_trait::async_trait]
impl ClinicService<Value, ()> for BoomOnCreate {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create, ServiceMethodKind::Find])
    }

    async fn create(&self, _ctx: &TenantContext, _data: Value, _params: ()) -> anyhow::Result<Value> {
        Err(anyhow::anyhow!("boom"))
    }

    async fn find(&self, ctx: &TenantContext, _params: ()) -> anyhow::Result<Vec<Value>> {
        Err(TenancyError::statement_failed(
            ctx.schema.as_str(),
            "things.find",
            "relation \"things\" does not exist",
        )
        .into())
    }
}

fn tenancy() -> TenantMiddleware {
    let registry = MemoryRegistry::new();
    registry.insert(TenantRecord::new("cir", "clinic_cir", "cir.painelagenda.com.br"));
    TenantMiddleware::new(TenantResolver::new(Arc::new(registry)))
}

fn post(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/things")
        .header("content-type", "application/json")
        .header("x-tenant-slug", "cir")
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn malformed_json_returns_bad_request() {
    let app: ClinicApp<Value, ()> = ClinicApp::new();
    let router = axum(app, tenancy())
        .use_service("/things", Arc::new(BoomOnCreate))
        .into_router();

    let res = router.oneshot(post("{\"full_name\":\"x\"")).await.unwrap();

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.headers().get("x-request-id").is_some());
    let body = json_body(res).await;
    assert_eq!(body["name"], "BadRequest");
    assert_eq!(body["code"], 400);
    assert_eq!(body["className"], "bad-request");
    assert!(body.get("errors").is_some());
}

#[tokio::test]
async fn request_id_is_preserved_when_provided() {
    let app: ClinicApp<Value, ()> = ClinicApp::new();
    let router = axum(app, tenancy())
        .use_service("/things", Arc::new(BoomOnCreate))
        .into_router();

    let provided = HeaderValue::from_static("req-test-123");
    let mut req = post("{\"full_name\":\"ok\"}");
    req.headers_mut().insert("x-request-id", provided.clone());
    let res = router.oneshot(req).await.unwrap();

    assert_eq!(res.headers().get("x-request-id").unwrap(), &provided);
}

#[tokio::test]
async fn unprocessable_preserves_422_and_shape() {
    let app: ClinicApp<Value, ()> = ClinicApp::new();
    let router = axum(app, tenancy())
        .use_service("/things", Arc::new(UnprocessableOnCreate))
        .into_router();

    let res = router.oneshot(post("{\"full_name\":\"\"}")).await.unwrap();

    assert_eq!(res.status().as_u16(), 422);
    let body = json_body(res).await;
    assert_eq!(body["name"], "Unprocessable");
    assert_eq!(body["code"], 422);
    assert_eq!(body["className"], "unprocessable");
    assert_eq!(body["errors"], json!({"full_name": ["full_name is required"]}));
}

#[tokio::test]
async fn plain_errors_map_to_general_error_shape() {
    let app: ClinicApp<Value, ()> = ClinicApp::new();
    let router = axum(app, tenancy())
        .use_service("/things", Arc::new(BoomOnCreate))
        .into_router();

    let res = router.oneshot(post("{\"full_name\":\"ok\"}")).await.unwrap();

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["name"], "GeneralError");
    assert_eq!(body["code"], 500);
    assert_eq!(body["className"], "general-error");
    assert!(body["message"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn statement_failures_carry_statement_name() {
    let app: ClinicApp<Value, ()> = ClinicApp::new();
    let router = axum(app, tenancy())
        .use_service("/things", Arc::new(BoomOnCreate))
        .into_router();

    let res = router
        .oneshot(
            Request::builder()
                .uri("/api/things")
                .header("x-tenant-slug", "cir")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["className"], "statement-failed");
    assert_eq!(body["data"], json!({"statement": "things.find"}));
    assert!(body["message"].as_str().unwrap().contains("does not exist"));
}

#[tokio::test]
async fn methods_outside_capabilities_are_not_mounted() {
    let app: ClinicApp<Value, ()> = ClinicApp::new();
    let router = axum(app, tenancy())
        .use_service("/things", Arc::new(UnprocessableOnCreate))
        .into_router();

    let res = router
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/things/1")
                .header("x-tenant-slug", "cir")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 404);
}
