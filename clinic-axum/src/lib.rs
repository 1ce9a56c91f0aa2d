//! clinic-axum: Axum adapter for the clinic backend.
//!
//! Builds a router in which every `/api` route sits behind the tenant
//! middleware, and mounts [`clinic_core::ClinicService`]s as REST resources.

pub mod app;
pub mod middleware;
pub mod params;
pub mod rest;
pub mod state;
mod error;
pub use error::ClinicAxumError;
pub use middleware::tenant::{resolve_tenant, Tenant, TenantMiddleware};
pub use state::ClinicAxumState;

pub use app::{axum, AxumApp};
