use std::sync::Arc;

use axum::handler::Handler;
use axum::extract::OriginalUri;
use axum::http::HeaderName;
use axum::routing::get;
use axum::Router;
use clinic_core::{ClinicApp, ClinicError, ClinicService};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::params::FromRestParams;
use crate::rest;
use crate::{resolve_tenant, ClinicAxumError, TenantMiddleware};

const REQUEST_ID: &str = "x-request-id";

async fn api_not_found(OriginalUri(uri): OriginalUri) -> ClinicAxumError {
    ClinicError::not_found(format!("No route for {}", uri.path())).into()
}

/// A clinic app plus the axum routes built so far.
///
/// Routes added with [`AxumApp::use_service`] / [`AxumApp::use_router`] are
/// tenant-scoped and end up under `/api`; [`AxumApp::use_get`] adds public
/// routes at the root.
pub struct AxumApp<R, P = ()>
where
    R: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    pub app: Arc<ClinicApp<R, P>>,
    tenancy: TenantMiddleware,
    api: Router<()>,
    public: Router<()>,
}

impl<R, P> Clone for AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            tenancy: self.tenancy.clone(),
            api: self.api.clone(),
            public: self.public.clone(),
        }
    }
}

impl<R, P> AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    pub fn new(app: ClinicApp<R, P>, tenancy: TenantMiddleware) -> Self {
        Self {
            app: Arc::new(app),
            tenancy,
            api: Router::new(),
            public: Router::new(),
        }
    }

    pub fn tenancy(&self) -> &TenantMiddleware {
        &self.tenancy
    }

    /// Nest a tenant-scoped router at `/api{path}`.
    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.api = self.api.nest(path, router);
        self
    }

    /// A public `GET` route outside `/api`; no tenant is resolved for it.
    pub fn use_get<H, T>(mut self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        self.public = self.public.route(path, get(handler));
        self
    }

    pub fn use_service(mut self, path: &'static str, service: Arc<dyn ClinicService<R, P>>) -> Self
    where
        R: Serialize + DeserializeOwned,
        P: FromRestParams,
    {
        let name = path.trim_start_matches('/');
        self.app.register_service(name, service);

        let service_name = Arc::new(name.to_string());
        let router = rest::service_router(Arc::clone(&service_name), Arc::clone(&self.app));

        self.api = self.api.nest(path, router);
        self
    }

    /// The complete router: tenant middleware on `/api` (unmatched `/api`
    /// paths included), then request ids, tracing and CORS around everything.
    pub fn into_router(self) -> Router<()> {
        let x_request_id = HeaderName::from_static(REQUEST_ID);

        let api = self
            .api
            .fallback(api_not_found)
            .layer(axum::middleware::from_fn_with_state(self.tenancy, resolve_tenant));

        Router::new()
            .nest("/api", api)
            .merge(self.public)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(x_request_id)),
            )
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }
}

pub fn axum<R, P>(app: ClinicApp<R, P>, tenancy: TenantMiddleware) -> AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    AxumApp::new(app, tenancy)
}
