use chrono::NaiveDate;
use clinic_core::ClinicError;

use crate::services::ClinicParams;

/// Query filters of `GET /appointments`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    /// Calendar day of `inicio`, in UTC.
    pub date: Option<NaiveDate>,
    pub professional_id: Option<i64>,
}

impl TryFrom<&ClinicParams> for AppointmentFilter {
    type Error = anyhow::Error;

    fn try_from(params: &ClinicParams) -> Result<Self, Self::Error> {
        let date = params
            .filter("date")
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    ClinicError::bad_request(format!("Invalid date filter: {raw}")).into_anyhow()
                })
            })
            .transpose()?;

        let professional_id = params
            .filter("professional_id")
            .map(|raw| {
                raw.parse::<i64>().map_err(|_| {
                    ClinicError::bad_request(format!("Invalid professional_id filter: {raw}"))
                        .into_anyhow()
                })
            })
            .transpose()?;

        Ok(Self {
            date,
            professional_id,
        })
    }
}
