//! Core value types shared across the workspace

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// Identifier of a tracked fleet vehicle.
///
/// The fleet registers vehicles `veh_1` through `veh_20`. Parsing is the
/// only constructor; anything else is rejected before a request is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    /// Highest registered vehicle number.
    pub const MAX: u8 = 20;

    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        let raw = raw.trim();
        let invalid = || LookupError::InvalidId(raw.to_string());

        let number = raw.strip_prefix("veh_").ok_or_else(invalid)?;
        if number.is_empty()
            || !number.bytes().all(|b| b.is_ascii_digit())
            || (number.len() > 1 && number.starts_with('0'))
        {
            return Err(invalid());
        }
        match number.parse::<u8>() {
            Ok(n) if (1..=Self::MAX).contains(&n) => Ok(Self(raw.to_string())),
            _ => Err(invalid()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last known position record returned by the fleet backend.
///
/// `lon`/`lat` are geographic degrees; `ang` is the heading in degrees
/// clockwise from north. The telemetry fields beyond the required four are
/// present only when the ingestion pipeline stored them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiclePosition {
    pub device_id: String,
    pub lon: f64,
    pub lat: f64,
    pub ang: f64,

    /// Sample time as epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// Speed in km/h.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    /// Fuel level in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<f64>,

    /// Engine temperature in degrees Celsius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Odometer reading in km.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odometer: Option<f64>,
}

impl VehiclePosition {
    /// Sample time as a UTC datetime, when the record carries one.
    pub fn sampled_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lon: self.lon,
            lat: self.lat,
        }
    }
}

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

/// Temporary, unauthenticated read credentials from the identity service.
///
/// Acquired once at startup and read-only afterwards; there is no refresh.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_key: String,
    pub session_token: String,
    pub expiration: Option<DateTime<Utc>>,
}

/// Signed style resource resolved for a named map.
///
/// Only the raster tile URL template is consumed by the renderer.
#[derive(Debug, Clone)]
pub struct StyleDescriptor {
    pub tile_template: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_registered_range() {
        for n in 1..=20 {
            let raw = format!("veh_{n}");
            assert_eq!(VehicleId::parse(&raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(VehicleId::parse("  veh_7 ").unwrap().as_str(), "veh_7");
    }

    #[test]
    fn rejects_out_of_range_and_malformed_ids() {
        for raw in [
            "", "veh_", "veh_0", "veh_21", "veh_100", "veh_01", "veh_1a", "veh_-1", "VEH_3",
            "bus_3", "3", "veh 3",
        ] {
            let err = VehicleId::parse(raw).unwrap_err();
            assert!(matches!(err, LookupError::InvalidId(_)), "accepted {raw:?}");
        }
    }

    #[test]
    fn position_parses_with_and_without_telemetry() {
        let bare: VehiclePosition = serde_json::from_str(
            r#"{"lon":-75.589,"lat":6.208,"ang":45.0,"device_id":"veh_3"}"#,
        )
        .unwrap();
        assert_eq!(bare.device_id, "veh_3");
        assert_eq!(bare.speed, None);

        let full: VehiclePosition = serde_json::from_str(
            r#"{"lon":-75.5,"lat":6.2,"ang":180.0,"device_id":"veh_9",
                "timestamp":1700000000,"speed":62.5,"fuel":48.0,
                "temperature":88.2,"odometer":120934.0}"#,
        )
        .unwrap();
        assert_eq!(full.speed, Some(62.5));
        assert!(full.sampled_at().is_some());
    }

    #[test]
    fn position_missing_required_field_is_an_error() {
        let result: std::result::Result<VehiclePosition, _> =
            serde_json::from_str(r#"{"lon":-75.589,"ang":45.0,"device_id":"veh_3"}"#);
        assert!(result.is_err());
    }
}
