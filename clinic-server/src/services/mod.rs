use std::sync::Arc;

use clinic_core::ClinicService;
use serde_json::Value;

pub mod types;
pub use types::{ClinicParams, ClinicState};

pub mod support;

pub mod appointments;
pub mod dashboard;
pub mod health_insurances;
pub mod messages;
pub mod patients;
pub mod professionals;
pub mod specialties;
pub mod tenant;

type SharedService = Arc<dyn ClinicService<Value, ClinicParams>>;

/// The table-backed services, ready to be mounted.
pub struct ClinicServices {
    pub professionals: SharedService,
    pub patients: SharedService,
    pub appointments: SharedService,
    pub specialties: SharedService,
    pub health_insurances: SharedService,
    pub messages: SharedService,
}

pub fn configure(state: Arc<ClinicState>) -> ClinicServices {
    ClinicServices {
        professionals: Arc::new(professionals::ProfessionalsService {
            state: Arc::clone(&state),
        }),
        patients: Arc::new(patients::PatientsService {
            state: Arc::clone(&state),
        }),
        appointments: Arc::new(appointments::AppointmentsService {
            state: Arc::clone(&state),
        }),
        specialties: Arc::new(specialties::SpecialtiesService {
            state: Arc::clone(&state),
        }),
        health_insurances: Arc::new(health_insurances::HealthInsurancesService {
            state: Arc::clone(&state),
        }),
        messages: Arc::new(messages::MessagesService { state }),
    }
}
