use anyhow::Result;
use clinic_core::ClinicApp;
use serde_json::Value;

use crate::services::ClinicParams;

/// A fresh app, configured from the environment.
pub fn clinic_app() -> Result<ClinicApp<Value, ClinicParams>> {
    let app: ClinicApp<Value, ClinicParams> = ClinicApp::new();
    crate::config::config(&app)?;
    Ok(app)
}
