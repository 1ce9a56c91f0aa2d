use async_trait::async_trait;
use clinic_core::{TenancyError, TenantRecord, TenantRegistry, TenantSlug};
use sqlx::postgres::PgPool;
use sqlx::FromRow;

const FIND_ACTIVE: &str = "SELECT slug, schema_name, primary_domain, is_active \
     FROM public.tenants WHERE slug = $1 AND is_active = true";

const DESCRIBE: &str = "SELECT slug, schema_name, primary_domain, is_active \
     FROM public.tenants WHERE slug = $1";

#[derive(FromRow)]
struct TenantRow {
    slug: String,
    schema_name: String,
    primary_domain: Option<String>,
    is_active: bool,
}

impl From<TenantRow> for TenantRecord {
    fn from(row: TenantRow) -> Self {
        TenantRecord {
            slug: row.slug,
            schema_name: row.schema_name,
            primary_domain: row.primary_domain.unwrap_or_default(),
            is_active: row.is_active,
        }
    }
}

/// [`TenantRegistry`] over `public.tenants`.
///
/// Lookups run directly on the pool; they never touch a tenant schema.
#[derive(Clone)]
pub struct PgTenantRegistry {
    pool: PgPool,
}

impl PgTenantRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, sql: &str, slug: &TenantSlug) -> Result<Option<TenantRecord>, TenancyError> {
        let row = sqlx::query_as::<_, TenantRow>(sql)
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(TenancyError::resolution_failed)?;
        Ok(row.map(TenantRecord::from))
    }
}

#[async_trait]
impl TenantRegistry for PgTenantRegistry {
    async fn find_active(&self, slug: &TenantSlug) -> Result<Option<TenantRecord>, TenancyError> {
        self.fetch(FIND_ACTIVE, slug).await
    }

    async fn describe(&self, slug: &TenantSlug) -> Result<Option<TenantRecord>, TenancyError> {
        self.fetch(DESCRIBE, slug).await
    }
}
