use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use clinic_core::ClinicConfigSnapshot;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

/// Where the pool connects to.
#[derive(Clone)]
pub enum PgTarget {
    /// A `postgres://` connection string.
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
}

impl fmt::Debug for PgTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PgTarget::Url(_) => f.write_str("Url(<redacted>)"),
            PgTarget::Parts {
                host,
                port,
                database,
                ..
            } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("database", database)
                .finish_non_exhaustive(),
        }
    }
}

impl PgTarget {
    fn connect_options(&self) -> Result<PgConnectOptions> {
        match self {
            PgTarget::Url(url) => url
                .parse::<PgConnectOptions>()
                .context("DATABASE_URL is not a valid postgres connection string"),
            PgTarget::Parts {
                host,
                port,
                user,
                password,
                database,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(database)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgPoolSettings {
    pub target: PgTarget,
    pub max_connections: u32,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl PgPoolSettings {
    pub fn new(target: PgTarget) -> Self {
        Self {
            target,
            max_connections: 20,
            idle_timeout: Duration::from_secs(30),
            acquire_timeout: Duration::from_secs(5),
        }
    }

    /// Read `db.*` keys, falling back to the defaults above.
    ///
    /// `db.url` wins over the individual `db.host`/`db.port`/... keys.
    pub fn from_config(cfg: &ClinicConfigSnapshot) -> Result<Self> {
        let target = match cfg.get_string("db.url") {
            Some(url) if !url.is_empty() => PgTarget::Url(url),
            _ => PgTarget::Parts {
                host: cfg.get_string("db.host").unwrap_or_else(|| "localhost".into()),
                port: cfg
                    .get("db.port")
                    .map(|p| p.parse::<u16>().context("db.port must be a port number"))
                    .transpose()?
                    .unwrap_or(5432),
                user: cfg.get_string("db.user").unwrap_or_else(|| "postgres".into()),
                password: cfg.get_string("db.password").unwrap_or_default(),
                database: cfg.get_string("db.name").unwrap_or_else(|| "postgres".into()),
            },
        };

        let mut settings = Self::new(target);
        if let Some(max) = cfg.get_u64("db.max_connections") {
            settings.max_connections = u32::try_from(max).context("db.max_connections is too large")?;
        }
        if let Some(idle) = cfg.get_secs("db.idle_timeout_secs") {
            settings.idle_timeout = idle;
        }
        if let Some(acquire) = cfg.get_secs("db.acquire_timeout_secs") {
            settings.acquire_timeout = acquire;
        }
        Ok(settings)
    }
}

pub struct PgPoolFactory;

impl PgPoolFactory {
    /// Build the pool and open its first connection.
    pub async fn connect(settings: &PgPoolSettings) -> Result<PgPool> {
        let pool = Self::options(settings)
            .connect_with(settings.target.connect_options()?)
            .await
            .context("failed to connect to postgres")?;

        info!(
            max_connections = settings.max_connections,
            idle_timeout_secs = settings.idle_timeout.as_secs(),
            acquire_timeout_secs = settings.acquire_timeout.as_secs(),
            "postgres pool ready"
        );
        Ok(pool)
    }

    /// Build the pool without connecting; connections open on first use.
    pub fn connect_lazy(settings: &PgPoolSettings) -> Result<PgPool> {
        Ok(Self::options(settings).connect_lazy_with(settings.target.connect_options()?))
    }

    fn options(settings: &PgPoolSettings) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .idle_timeout(Some(settings.idle_timeout))
            .acquire_timeout(settings.acquire_timeout)
    }
}
