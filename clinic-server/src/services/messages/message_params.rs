use chrono::NaiveDate;
use clinic_core::ClinicError;

use crate::services::ClinicParams;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Sent => "sent",
            Direction::Received => "received",
        }
    }
}

/// Query filters of `GET /messages`.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageFilter {
    /// Digits only; matched as a substring of the stored phone's digits.
    pub phone: Option<String>,
    pub client: Option<String>,
    /// `None` for `all`.
    pub direction: Option<Direction>,
    pub intent: Option<String>,
    pub date: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self {
            phone: None,
            client: None,
            direction: None,
            intent: None,
            date: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

fn bad_filter(key: &str, raw: &str) -> anyhow::Error {
    ClinicError::bad_request(format!("Invalid {key} filter: {raw}")).into_anyhow()
}

fn int_filter(params: &ClinicParams, key: &str) -> anyhow::Result<Option<i64>> {
    params
        .filter(key)
        .map(|raw| raw.parse::<i64>().map_err(|_| bad_filter(key, raw)))
        .transpose()
}

impl TryFrom<&ClinicParams> for MessageFilter {
    type Error = anyhow::Error;

    fn try_from(params: &ClinicParams) -> Result<Self, Self::Error> {
        let phone = params
            .filter("phone")
            .map(|raw| raw.chars().filter(char::is_ascii_digit).collect::<String>())
            .filter(|digits| !digits.is_empty());

        let direction = match params.filter("direction") {
            None | Some("all") => None,
            Some("sent") => Some(Direction::Sent),
            Some("received") => Some(Direction::Received),
            Some(other) => return Err(bad_filter("direction", other)),
        };

        let date = params
            .filter("date")
            .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| bad_filter("date", raw)))
            .transpose()?;

        let limit = int_filter(params, "limit")?
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);
        let offset = int_filter(params, "offset")?.unwrap_or(0).max(0);

        Ok(Self {
            phone,
            client: params.filter("client").map(str::to_string),
            direction,
            intent: params.filter("intent").map(str::to_string),
            date,
            limit,
            offset,
        })
    }
}
