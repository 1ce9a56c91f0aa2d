//! clinic-postgres: PostgreSQL backend for the clinic core.
//!
//! - [`PgPoolFactory`] builds the bounded sqlx pool.
//! - [`PgTenantRegistry`] reads `public.tenants`.
//! - [`PgConnectionSource`] hands out transaction-scoped sessions to
//!   [`clinic_core::PooledExecutor`].

mod bind;
pub mod pool;
pub mod registry;
pub mod source;

pub use pool::{PgPoolFactory, PgPoolSettings, PgTarget};
pub use registry::PgTenantRegistry;
pub use source::{PgConnectionSource, PgSession};

/// The production executor.
pub type PgExecutor = clinic_core::PooledExecutor<PgConnectionSource>;
