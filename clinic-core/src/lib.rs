//! clinic-core: framework-agnostic core of the clinic scheduling backend.
//!
//! Tenant resolution ([`TenantResolver`]) and schema-scoped execution
//! ([`ScopedExecutor`]) live here, next to the service abstraction the HTTP
//! layer routes into.

pub mod app;
pub mod config;
pub mod errors;
pub mod executor;
pub mod memory;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod tenant;

pub use app::{ClinicApp, ServiceHandle};
pub use config::{ClinicConfig, ClinicConfigSnapshot};
pub use errors::{BoxError, ClinicError, ClinicResult, ErrorKind, TenancyError};
pub use executor::{
    ConnectionSource, PooledExecutor, QueryResult, ScopedExecutor, ScopedSession, SqlParam,
    Statement, StatementKind,
};
pub use registry::ServiceRegistry;
pub use resolver::{CacheSettings, TenantRegistry, TenantResolver};
pub use service::{ClinicService, ServiceCapabilities, ServiceMethodKind};
pub use tenant::{SchemaName, TenantContext, TenantRecord, TenantSlug};
