use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    routing::{self, MethodRouter},
    Json, Router,
};
use clinic_core::{ClinicApp, ClinicError, ServiceMethodKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::{
    params::{FromRestParams, RestParams},
    ClinicAxumError, ClinicAxumState, Tenant,
};

type QueryMap = Query<HashMap<String, String>>;

fn map_json_rejection(rejection: JsonRejection) -> ClinicAxumError {
    ClinicError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.to_string()]}))
        .into()
}

fn rest_params<P: FromRestParams>(
    headers: &HeaderMap,
    query: HashMap<String, String>,
    method: &str,
    uri: &Uri,
) -> P {
    P::from_rest_params(RestParams::from_parts("rest", headers, query, method, uri))
}

/// REST routes for one service, mounted according to its capabilities:
///
/// | method | path              | service call            |
/// |--------|-------------------|-------------------------|
/// | GET    | `/`               | `find`                  |
/// | POST   | `/`               | `create` (201)          |
/// | GET    | `/{id}`           | `get`                   |
/// | PUT    | `/{id}`           | `update`                |
/// | PATCH  | `/{id}`           | `patch`                 |
/// | DELETE | `/{id}`           | `remove` (204)          |
/// | PATCH  | `/{id}/{custom}`  | `custom("{custom}")`    |
///
/// Every handler takes its tenant from the request extensions, so the
/// router must sit behind [`crate::resolve_tenant`].
pub fn service_router<R, P>(service_name: Arc<String>, app: Arc<ClinicApp<R, P>>) -> Router<()>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + 'static,
{
    let capabilities = match app.service(&service_name) {
        Ok(svc) => svc.inner().capabilities(),
        Err(_) => return Router::new(),
    };
    let allows = |m: ServiceMethodKind| capabilities.allows(&m);
    let state = ClinicAxumState { app };

    let mut collection: MethodRouter<ClinicAxumState<R, P>> = MethodRouter::new();
    let mut item: MethodRouter<ClinicAxumState<R, P>> = MethodRouter::new();

    if allows(ServiceMethodKind::Find) {
        let service_name = Arc::clone(&service_name);
        collection = collection.get(
            move |State(state): State<ClinicAxumState<R, P>>,
                  Tenant(tenant): Tenant,
                  headers: HeaderMap,
                  Query(query): QueryMap,
                  OriginalUri(uri): OriginalUri| async move {
                let params = rest_params::<P>(&headers, query, "GET", &uri);
                let svc = state.app.service(&service_name)?;
                let res = svc.find(&tenant, params).await?;
                Ok::<_, ClinicAxumError>(Json(res))
            },
        );
    }

    if allows(ServiceMethodKind::Create) {
        let service_name = Arc::clone(&service_name);
        collection = collection.post(
            move |State(state): State<ClinicAxumState<R, P>>,
                  Tenant(tenant): Tenant,
                  headers: HeaderMap,
                  Query(query): QueryMap,
                  OriginalUri(uri): OriginalUri,
                  data: Result<Json<R>, JsonRejection>| async move {
                let Json(data) = data.map_err(map_json_rejection)?;
                let params = rest_params::<P>(&headers, query, "POST", &uri);
                let svc = state.app.service(&service_name)?;
                let res = svc.create(&tenant, data, params).await?;
                Ok::<_, ClinicAxumError>((StatusCode::CREATED, Json(res)))
            },
        );
    }

    if allows(ServiceMethodKind::Get) {
        let service_name = Arc::clone(&service_name);
        item = item.get(
            move |State(state): State<ClinicAxumState<R, P>>,
                  Tenant(tenant): Tenant,
                  headers: HeaderMap,
                  Query(query): QueryMap,
                  OriginalUri(uri): OriginalUri,
                  Path(id): Path<String>| async move {
                let params = rest_params::<P>(&headers, query, "GET", &uri);
                let svc = state.app.service(&service_name)?;
                let res = svc.get(&tenant, &id, params).await?;
                Ok::<_, ClinicAxumError>(Json(res))
            },
        );
    }

    if allows(ServiceMethodKind::Update) {
        let service_name = Arc::clone(&service_name);
        item = item.put(
            move |State(state): State<ClinicAxumState<R, P>>,
                  Tenant(tenant): Tenant,
                  headers: HeaderMap,
                  Query(query): QueryMap,
                  OriginalUri(uri): OriginalUri,
                  Path(id): Path<String>,
                  data: Result<Json<R>, JsonRejection>| async move {
                let Json(data) = data.map_err(map_json_rejection)?;
                let params = rest_params::<P>(&headers, query, "PUT", &uri);
                let svc = state.app.service(&service_name)?;
                let res = svc.update(&tenant, &id, data, params).await?;
                Ok::<_, ClinicAxumError>(Json(res))
            },
        );
    }

    if allows(ServiceMethodKind::Patch) {
        let service_name = Arc::clone(&service_name);
        item = item.patch(
            move |State(state): State<ClinicAxumState<R, P>>,
                  Tenant(tenant): Tenant,
                  headers: HeaderMap,
                  Query(query): QueryMap,
                  OriginalUri(uri): OriginalUri,
                  Path(id): Path<String>,
                  data: Result<Json<R>, JsonRejection>| async move {
                let Json(data) = data.map_err(map_json_rejection)?;
                let params = rest_params::<P>(&headers, query, "PATCH", &uri);
                let svc = state.app.service(&service_name)?;
                let res = svc.patch(&tenant, &id, data, params).await?;
                Ok::<_, ClinicAxumError>(Json(res))
            },
        );
    }

    if allows(ServiceMethodKind::Remove) {
        let service_name = Arc::clone(&service_name);
        item = item.delete(
            move |State(state): State<ClinicAxumState<R, P>>,
                  Tenant(tenant): Tenant,
                  headers: HeaderMap,
                  Query(query): QueryMap,
                  OriginalUri(uri): OriginalUri,
                  Path(id): Path<String>| async move {
                let params = rest_params::<P>(&headers, query, "DELETE", &uri);
                let svc = state.app.service(&service_name)?;
                svc.remove(&tenant, &id, params).await?;
                Ok::<_, ClinicAxumError>(StatusCode::NO_CONTENT)
            },
        );
    }

    let mut router: Router<ClinicAxumState<R, P>> = Router::new();
    if allows(ServiceMethodKind::Find) || allows(ServiceMethodKind::Create) {
        router = router.route("/", collection);
    }
    if [
        ServiceMethodKind::Get,
        ServiceMethodKind::Update,
        ServiceMethodKind::Patch,
        ServiceMethodKind::Remove,
    ]
    .into_iter()
    .any(allows)
    {
        router = router.route("/{id}", item);
    }

    for method in capabilities.custom_methods() {
        let service_name = Arc::clone(&service_name);
        router = router.route(
            &format!("/{{id}}/{method}"),
            routing::patch(
                move |State(state): State<ClinicAxumState<R, P>>,
                      Tenant(tenant): Tenant,
                      headers: HeaderMap,
                      Query(query): QueryMap,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>,
                      data: Result<Json<R>, JsonRejection>| async move {
                    let Json(data) = data.map_err(map_json_rejection)?;
                    let params = rest_params::<P>(&headers, query, "PATCH", &uri);
                    let svc = state.app.service(&service_name)?;
                    let res = svc.custom(&tenant, method, &id, data, params).await?;
                    Ok::<_, ClinicAxumError>(Json(res))
                },
            ),
        );
    }

    router.with_state(state)
}
