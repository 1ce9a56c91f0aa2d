pub mod appointment_params;
pub mod appointments_schema;
pub mod appointments_service;
pub mod appointments_shared;

pub use appointment_params::AppointmentFilter;
pub use appointments_service::AppointmentsService;
