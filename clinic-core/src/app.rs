use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

use crate::{
    ClinicConfig, ClinicConfigSnapshot, ClinicError, ClinicService, ServiceMethodKind,
    ServiceRegistry, TenantContext,
};

struct ClinicAppInner<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    registry: RwLock<ServiceRegistry<R, P>>,
    config: RwLock<ClinicConfig>,
}

/// Central application container.
///
/// Framework-agnostic. Holds the service registry and the config store;
/// HTTP adapters wrap it and route requests into [`ServiceHandle`]s.
pub struct ClinicApp<R, P = ()>
where
    R: Send + 'static,
    P: Send + 'static,
{
    inner: Arc<ClinicAppInner<R, P>>,
}

impl<R, P> Default for ClinicApp<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> Clone for ClinicApp<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, P> ClinicApp<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ClinicAppInner {
                registry: RwLock::new(ServiceRegistry::new()),
                config: RwLock::new(ClinicConfig::new()),
            }),
        }
    }

    pub fn register_service<S>(&self, name: S, service: Arc<dyn ClinicService<R, P>>)
    where
        S: Into<String>,
    {
        self.inner.registry.write().register(name, service);
    }

    /// `app.service("name")`
    pub fn service(&self, name: &str) -> Result<ServiceHandle<R, P>> {
        let service = self
            .inner
            .registry
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("ClinicService not found: {name}"))?;

        Ok(ServiceHandle {
            name: name.to_string(),
            service,
        })
    }

    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .registry
            .read()
            .names()
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    /// `app.set(key, value)`
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.config.write().set(key, value);
    }

    /// `app.get(key)`
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.config.read().get(key).map(str::to_string)
    }

    pub fn config_snapshot(&self) -> ClinicConfigSnapshot {
        self.inner.config.read().snapshot()
    }
}

/// A named service, with calls checked against its declared capabilities.
pub struct ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    name: String,
    service: Arc<dyn ClinicService<R, P>>,
}

impl<R, P> Clone for ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            service: Arc::clone(&self.service),
        }
    }
}

impl<R, P> ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inner(&self) -> &Arc<dyn ClinicService<R, P>> {
        &self.service
    }

    fn ensure(&self, method: ServiceMethodKind) -> Result<()> {
        if self.service.capabilities().allows(&method) {
            Ok(())
        } else {
            Err(ClinicError::method_not_allowed(format!(
                "Method {method:?} is not allowed on service '{}'",
                self.name
            ))
            .into_anyhow())
        }
    }

    pub async fn find(&self, ctx: &TenantContext, params: P) -> Result<Vec<R>> {
        self.ensure(ServiceMethodKind::Find)?;
        self.service.find(ctx, params).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: &str, params: P) -> Result<R> {
        self.ensure(ServiceMethodKind::Get)?;
        self.service.get(ctx, id, params).await
    }

    pub async fn create(&self, ctx: &TenantContext, data: R, params: P) -> Result<R> {
        self.ensure(ServiceMethodKind::Create)?;
        self.service.create(ctx, data, params).await
    }

    pub async fn update(&self, ctx: &TenantContext, id: &str, data: R, params: P) -> Result<R> {
        self.ensure(ServiceMethodKind::Update)?;
        self.service.update(ctx, id, data, params).await
    }

    pub async fn patch(&self, ctx: &TenantContext, id: &str, data: R, params: P) -> Result<R> {
        self.ensure(ServiceMethodKind::Patch)?;
        self.service.patch(ctx, id, data, params).await
    }

    pub async fn remove(&self, ctx: &TenantContext, id: &str, params: P) -> Result<R> {
        self.ensure(ServiceMethodKind::Remove)?;
        self.service.remove(ctx, id, params).await
    }

    pub async fn custom(
        &self,
        ctx: &TenantContext,
        method: &'static str,
        id: &str,
        data: R,
        params: P,
    ) -> Result<R> {
        self.ensure(ServiceMethodKind::Custom(method))?;
        self.service.custom(ctx, method, id, data, params).await
    }
}
