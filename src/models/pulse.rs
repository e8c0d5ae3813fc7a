//! Upstream pulse model (OTX `pulses/subscribed`)

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use super::Threat;

/// One page of subscribed pulses
#[derive(Debug, Deserialize)]
pub struct PulsePage {
    #[serde(default)]
    pub results: Vec<Pulse>,
}

/// Pulse as published by the feed
#[derive(Debug, Clone, Deserialize)]
pub struct Pulse {
    /// Only used to identify skipped pulses in logs
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub modified: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PulseError {
    #[error("pulse has no modified timestamp")]
    MissingModified,
    #[error("invalid modified timestamp: {0}")]
    InvalidModified(String),
}

impl Pulse {
    /// Map into a threat record, tags defaulting to empty
    pub fn into_threat(self) -> Result<Threat, PulseError> {
        let modified = self.modified.ok_or(PulseError::MissingModified)?;
        let created_at = parse_modified(&modified)?;

        Ok(Threat {
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            created_at,
        })
    }
}

/// Parse an OTX timestamp. Naive timestamps are taken as UTC.
pub fn parse_modified(raw: &str) -> Result<DateTime<Utc>, PulseError> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| PulseError::InvalidModified(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_naive_otx_timestamp() {
        let ts = parse_modified("2024-01-15T10:23:45.123000").unwrap();
        assert_eq!(
            ts,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 23, 45).unwrap()
                + chrono::Duration::milliseconds(123)
        );
    }

    #[test]
    fn test_parse_rfc3339_timestamp() {
        let ts = parse_modified("2024-01-15T12:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_invalid_timestamp() {
        assert_eq!(
            parse_modified("last tuesday"),
            Err(PulseError::InvalidModified("last tuesday".to_string()))
        );
    }

    #[test]
    fn test_into_threat_defaults_tags() {
        let pulse: Pulse = serde_json::from_value(serde_json::json!({
            "name": "Volt Typhoon",
            "description": "PRC state actor",
            "modified": "2024-05-01T00:00:00"
        }))
        .unwrap();

        let threat = pulse.into_threat().unwrap();
        assert_eq!(threat.name, "Volt Typhoon");
        assert!(threat.tags.is_empty());
    }

    #[test]
    fn test_into_threat_null_tags() {
        let pulse: Pulse = serde_json::from_value(serde_json::json!({
            "name": "x",
            "tags": null,
            "modified": "2024-05-01T00:00:00"
        }))
        .unwrap();

        let threat = pulse.into_threat().unwrap();
        assert!(threat.tags.is_empty());
        assert_eq!(threat.description, "");
    }

    #[test]
    fn test_into_threat_missing_modified() {
        let pulse: Pulse = serde_json::from_value(serde_json::json!({ "name": "x" })).unwrap();
        assert_eq!(pulse.into_threat(), Err(PulseError::MissingModified));
    }
}
