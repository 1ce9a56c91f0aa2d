use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderName, Request};
use axum::routing::get;
use axum::{Json, Router};
use clinic_axum::{axum, Tenant, TenantMiddleware};
use clinic_core::memory::MemoryRegistry;
use clinic_core::{CacheSettings, ClinicApp, TenantRecord, TenantResolver};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn registry() -> Arc<MemoryRegistry> {
    let registry = MemoryRegistry::new();
    registry.insert(TenantRecord::new("cir", "clinic_cir", "cir.painelagenda.com.br"));
    registry.insert(TenantRecord::new("old", "clinic_old", "old.painelagenda.com.br").inactive());
    Arc::new(registry)
}

fn whoami() -> Router {
    Router::new().route(
        "/",
        get(|Tenant(tenant): Tenant| async move {
            Json(json!({ "schema": tenant.schema.as_str(), "slug": tenant.slug.as_str() }))
        }),
    )
}

fn router(tenancy: TenantMiddleware) -> Router {
    let app: ClinicApp<Value, ()> = ClinicApp::new();
    axum(app, tenancy)
        .use_router("/whoami", whoami())
        .use_get("/health", || async { "ok" })
        .into_router()
}

async fn call(router: Router, header: Option<(&str, &str)>, uri: &str) -> (u16, Value) {
    let mut req = Request::builder().uri(uri);
    if let Some((name, value)) = header {
        req = req.header(name, value);
    }
    let res = router.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
    let status = res.status().as_u16();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn known_tenant_reaches_the_handler_with_its_schema() {
    let registry = registry();
    let router = router(TenantMiddleware::new(TenantResolver::new(registry.clone())));

    let (status, body) = call(router, Some(("x-tenant-slug", "cir")), "/api/whoami").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "schema": "clinic_cir", "slug": "cir" }));
    assert_eq!(registry.calls(), 1);
}

#[tokio::test]
async fn unknown_tenant_is_404_tenant_not_found() {
    let router = router(TenantMiddleware::new(TenantResolver::new(registry())));

    let (status, body) = call(router, Some(("x-tenant-slug", "nope")), "/api/whoami").await;
    assert_eq!(status, 404);
    assert_eq!(body["className"], "tenant-not-found");
    assert_eq!(body["data"], json!({ "slug": "nope" }));
}

#[tokio::test]
async fn inactive_tenant_is_404_tenant_not_found() {
    let router = router(TenantMiddleware::new(TenantResolver::new(registry())));

    let (status, body) = call(router, Some(("x-tenant-slug", "old")), "/api/whoami").await;
    assert_eq!(status, 404);
    assert_eq!(body["className"], "tenant-not-found");
}

#[tokio::test]
async fn missing_or_empty_header_never_reaches_the_registry() {
    let registry = registry();
    let tenancy = TenantMiddleware::new(TenantResolver::new(registry.clone()));

    let (status, body) = call(router(tenancy.clone()), None, "/api/whoami").await;
    assert_eq!(status, 400);
    assert_eq!(body["className"], "missing-tenant");

    let (status, _) = call(router(tenancy), Some(("x-tenant-slug", "")), "/api/whoami").await;
    assert_eq!(status, 400);

    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn registry_outage_is_500_resolution_failed_without_driver_detail() {
    let registry = registry();
    registry.set_unavailable(true);
    let router = router(TenantMiddleware::new(TenantResolver::new(registry)));

    let (status, body) = call(router, Some(("x-tenant-slug", "cir")), "/api/whoami").await;
    assert_eq!(status, 500);
    assert_eq!(body["className"], "resolution-failed");
    assert!(!body.to_string().contains("connection refused"));
}

#[tokio::test]
async fn header_name_is_configurable() {
    let tenancy = TenantMiddleware::new(TenantResolver::new(registry()))
        .with_header(HeaderName::from_static("x-clinic"));

    let (status, _) = call(router(tenancy.clone()), Some(("x-clinic", "cir")), "/api/whoami").await;
    assert_eq!(status, 200);

    let (status, _) = call(router(tenancy), Some(("x-tenant-slug", "cir")), "/api/whoami").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn cached_resolution_skips_the_registry() {
    let registry = registry();
    let resolver = TenantResolver::new(registry.clone()).with_cache(CacheSettings {
        ttl: std::time::Duration::from_secs(60),
        capacity: 16,
    });
    let tenancy = TenantMiddleware::new(resolver);

    for _ in 0..3 {
        let (status, _) = call(router(tenancy.clone()), Some(("x-tenant-slug", "cir")), "/api/whoami").await;
        assert_eq!(status, 200);
    }
    assert_eq!(registry.calls(), 1);
}

#[tokio::test]
async fn public_routes_skip_tenant_resolution() {
    let registry = registry();
    let router = router(TenantMiddleware::new(TenantResolver::new(registry.clone())));

    let res = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn unmatched_api_paths_still_require_a_tenant() {
    let registry = registry();
    let tenancy = TenantMiddleware::new(TenantResolver::new(registry.clone()));

    let (status, body) = call(router(tenancy.clone()), None, "/api/nowhere").await;
    assert_eq!(status, 400);
    assert_eq!(body["className"], "missing-tenant");
    assert_eq!(registry.calls(), 0);

    let (status, body) = call(router(tenancy), Some(("x-tenant-slug", "cir")), "/api/nowhere").await;
    assert_eq!(status, 404);
    assert_eq!(body["className"], "not-found");
    assert_eq!(body["message"], "No route for /api/nowhere");
}
