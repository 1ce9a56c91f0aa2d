//! Tenant resolution: slug → schema, through the global registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::TenancyError;
use crate::tenant::{TenantContext, TenantRecord, TenantSlug};

/// Read access to the tenant registry (`public.tenants`).
///
/// Implementations report lookup failures as
/// [`TenancyError::TenantResolutionFailed`] and a missing row as `Ok(None)`.
#[async_trait]
pub trait TenantRegistry: Send + Sync {
    /// The entry for `slug` if it exists and is active.
    async fn find_active(&self, slug: &TenantSlug) -> Result<Option<TenantRecord>, TenancyError>;

    /// The entry for `slug` regardless of its active flag.
    async fn describe(&self, slug: &TenantSlug) -> Result<Option<TenantRecord>, TenancyError>;
}

/// Bounds for the optional resolution cache.
#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::ZERO,
            capacity: 1024,
        }
    }
}

impl CacheSettings {
    pub fn enabled(&self) -> bool {
        !self.ttl.is_zero() && self.capacity > 0
    }
}

struct CacheEntry {
    tenant: TenantContext,
    stored_at: Instant,
}

struct TenantCache {
    settings: CacheSettings,
    entries: RwLock<HashMap<TenantSlug, CacheEntry>>,
}

impl TenantCache {
    async fn get(&self, slug: &TenantSlug) -> Option<TenantContext> {
        let entries = self.entries.read().await;
        entries
            .get(slug)
            .filter(|e| e.stored_at.elapsed() < self.settings.ttl)
            .map(|e| e.tenant.clone())
    }

    async fn put(&self, tenant: TenantContext) {
        let mut entries = self.entries.write().await;
        if entries.len() >= self.settings.capacity && !entries.contains_key(&tenant.slug) {
            let ttl = self.settings.ttl;
            entries.retain(|_, e| e.stored_at.elapsed() < ttl);

            if entries.len() >= self.settings.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.stored_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            tenant.slug.clone(),
            CacheEntry {
                tenant,
                stored_at: Instant::now(),
            },
        );
    }
}

/// Resolves tenant slugs to tenant contexts.
///
/// Every resolution goes to the registry unless a cache is configured with
/// [`TenantResolver::with_cache`]. Only successful resolutions are cached.
#[derive(Clone)]
pub struct TenantResolver {
    registry: Arc<dyn TenantRegistry>,
    cache: Option<Arc<TenantCache>>,
}

impl TenantResolver {
    pub fn new(registry: Arc<dyn TenantRegistry>) -> Self {
        Self {
            registry,
            cache: None,
        }
    }

    pub fn with_cache(mut self, settings: CacheSettings) -> Self {
        self.cache = settings.enabled().then(|| {
            Arc::new(TenantCache {
                settings,
                entries: RwLock::new(HashMap::new()),
            })
        });
        self
    }

    /// Resolve an active tenant by exact slug.
    pub async fn resolve(&self, slug: &TenantSlug) -> Result<TenantContext, TenancyError> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(slug).await {
                debug!(tenant = %slug, "tenant resolved from cache");
                return Ok(hit);
            }
        }

        let record = self
            .registry
            .find_active(slug)
            .await?
            .filter(|r| r.is_active)
            .ok_or_else(|| TenancyError::TenantNotFound {
                slug: slug.to_string(),
            })?;

        let tenant = TenantContext::from_record(record)?;
        debug!(tenant = %slug, schema = %tenant.schema, "tenant resolved");

        if let Some(cache) = &self.cache {
            cache.put(tenant.clone()).await;
        }
        Ok(tenant)
    }

    /// Slug, schema and primary domain of a registered tenant.
    pub async fn describe(&self, slug: &TenantSlug) -> Result<TenantContext, TenancyError> {
        let record = self
            .registry
            .describe(slug)
            .await?
            .ok_or_else(|| TenancyError::TenantNotFound {
                slug: slug.to_string(),
            })?;
        TenantContext::from_record(record)
    }
}
