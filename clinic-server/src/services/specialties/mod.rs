pub mod specialties_schema;
pub mod specialties_service;
pub mod specialties_shared;

pub use specialties_service::SpecialtiesService;
