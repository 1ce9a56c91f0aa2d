pub mod professionals_schema;
pub mod professionals_service;
pub mod professionals_shared;

pub use professionals_service::ProfessionalsService;
