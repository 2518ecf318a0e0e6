//! Entity type definitions

pub mod audit;
pub mod block;
pub mod event;
pub mod orchard;
pub mod sector;

pub use audit::{AuditEntry, AuditTarget};
pub use block::{clamp_health, Block};
pub use event::{EventStatus, TreeEvent};
pub use orchard::Orchard;
pub use sector::Sector;

/// Timestamp wire format: RFC 3339 with milliseconds and a `Z` suffix,
/// e.g. `2024-06-01T08:30:00.000Z` (the shape the JSON persistence layer
/// has always used).
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn to_string(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_string(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Render a numeric field the way the web forms did: whole numbers without a
/// trailing `.0`, everything else with its natural precision.
pub fn display_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_iso_millis_shape() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        assert_eq!(iso_millis::to_string(&dt), "2024-06-01T08:30:00.000Z");
    }

    #[test]
    fn test_display_number() {
        assert_eq!(display_number(18.0), "18");
        assert_eq!(display_number(0.45), "0.45");
        assert_eq!(display_number(-2.0), "-2");
    }
}
