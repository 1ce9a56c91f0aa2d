pub mod health_insurances_schema;
pub mod health_insurances_service;
pub mod health_insurances_shared;

pub use health_insurances_service::HealthInsurancesService;
