use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize an optional field, treating `null` and blank strings as absent.
///
/// Forms post `""` for untouched inputs; a blank date or email is "no
/// value", not an invalid one.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => T::deserialize(v).map(Some).map_err(de::Error::custom),
    }
}

/// Optional string, trimmed. A whitespace-only value becomes `""` so a
/// `length(min = 1)` rule rejects it.
pub fn trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| s.trim().to_string()))
}

/// Optional timestamp: RFC 3339 with any offset, or a bare
/// `YYYY-MM-DDTHH:MM[:SS]` taken as UTC. Blank strings are absent.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = blank_as_none(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    parse_timestamp(raw.trim())
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "blank_as_none")]
        birth_date: Option<NaiveDate>,
        #[serde(default, deserialize_with = "blank_as_none")]
        insurance_plan_id: Option<i64>,
    }

    #[test]
    fn blanks_nulls_and_missing_are_none() {
        let form: Form = serde_json::from_value(json!({ "birth_date": "  ", "insurance_plan_id": null })).unwrap();
        assert!(form.birth_date.is_none());
        assert!(form.insurance_plan_id.is_none());

        let form: Form = serde_json::from_value(json!({})).unwrap();
        assert!(form.birth_date.is_none());
    }

    #[test]
    fn present_values_are_parsed_and_bad_ones_rejected() {
        let form: Form =
            serde_json::from_value(json!({ "birth_date": "1990-02-03", "insurance_plan_id": 4 })).unwrap();
        assert_eq!(form.birth_date, NaiveDate::from_ymd_opt(1990, 2, 3));
        assert_eq!(form.insurance_plan_id, Some(4));

        assert!(serde_json::from_value::<Form>(json!({ "birth_date": "03/02/1990" })).is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Named {
        #[serde(default, deserialize_with = "trimmed")]
        name: Option<String>,
    }

    #[test]
    fn trimmed_keeps_missing_and_null_apart_from_blank() {
        let named: Named = serde_json::from_value(json!({ "name": "  Ana  " })).unwrap();
        assert_eq!(named.name.as_deref(), Some("Ana"));

        let named: Named = serde_json::from_value(json!({ "name": "   " })).unwrap();
        assert_eq!(named.name.as_deref(), Some(""));

        let named: Named = serde_json::from_value(json!({ "name": null })).unwrap();
        assert!(named.name.is_none());

        let named: Named = serde_json::from_value(json!({})).unwrap();
        assert!(named.name.is_none());
    }

    #[test]
    fn timestamps_accept_offsets_and_bare_local_times() {
        let with_offset = parse_timestamp("2025-03-10T09:30:00-03:00").unwrap();
        assert_eq!(with_offset.to_rfc3339(), "2025-03-10T12:30:00+00:00");

        let bare = parse_timestamp("2025-03-10T09:30").unwrap();
        assert_eq!(bare.to_rfc3339(), "2025-03-10T09:30:00+00:00");

        assert!(parse_timestamp("tomorrow").is_none());
    }
}
