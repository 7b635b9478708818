//! Vehicle position lookup against the fleet backend

use flota_domain::provider::PositionLookup;
use flota_types::{LookupError, VehicleId, VehiclePosition};
use reqwest::blocking::Client;
use serde::Serialize;

use crate::identity::error_message;

/// Client for the fleet position backend.
///
/// One POST per lookup, authorized by a static API key header. The key is
/// a public-facing credential; the backend scopes and throttles it.
pub struct FleetApiClient {
    base_url: String,
    api_key: String,
    http: Client,
}

#[derive(Serialize)]
struct LookupRequest<'a> {
    #[serde(rename = "vehicleId")]
    vehicle_id: &'a str,
}

impl FleetApiClient {
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            http,
        }
    }

    fn data_url(&self) -> String {
        format!("{}/data", self.base_url.trim_end_matches('/'))
    }
}

impl PositionLookup for FleetApiClient {
    fn latest_position(&self, id: &VehicleId) -> Result<VehiclePosition, LookupError> {
        tracing::debug!(vehicle = id.as_str(), "requesting last known position");

        let response = self
            .http
            .post(self.data_url())
            .header("x-api-key", &self.api_key)
            .json(&LookupRequest {
                vehicle_id: id.as_str(),
            })
            .send()
            .map_err(|err| LookupError::Transport(err.to_string()))?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("error").to_string();
        let body = response
            .text()
            .map_err(|err| LookupError::Transport(err.to_string()))?;

        parse_lookup_response(status.as_u16(), &reason, &body)
    }
}

/// Map a raw backend response to a position record or a typed failure.
///
/// Non-2xx statuses carry the server's `error` message verbatim when the
/// body provides one. 2xx bodies that do not deserialize into a complete
/// record are schema failures, never a crash further down the pipeline.
pub fn parse_lookup_response(
    status: u16,
    reason: &str,
    body: &str,
) -> Result<VehiclePosition, LookupError> {
    if !(200..300).contains(&status) {
        return Err(LookupError::Http {
            status,
            message: error_message(body, reason),
        });
    }
    serde_json::from_str(body).map_err(|err| LookupError::Schema(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_parses_into_a_position() {
        let body = r#"{"lon":-75.589,"lat":6.208,"ang":45.0,"device_id":"veh_3"}"#;
        let position = parse_lookup_response(200, "OK", body).unwrap();
        assert_eq!(position.device_id, "veh_3");
        assert_eq!(position.lon, -75.589);
        assert_eq!(position.lat, 6.208);
    }

    #[test]
    fn not_found_carries_the_server_message() {
        let err = parse_lookup_response(404, "Not Found", r#"{"error":"not found"}"#).unwrap_err();
        match err {
            LookupError::Http { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn throttling_without_a_body_falls_back_to_the_reason() {
        let err = parse_lookup_response(429, "Too Many Requests", "").unwrap_err();
        match err {
            LookupError::Http { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Too Many Requests");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_required_field_is_a_schema_error() {
        let err =
            parse_lookup_response(200, "OK", r#"{"lon":-75.589,"ang":45.0,"device_id":"v"}"#)
                .unwrap_err();
        assert!(matches!(err, LookupError::Schema(_)));
    }

    #[test]
    fn request_body_uses_the_backend_field_name() {
        let id = VehicleId::parse("veh_3").unwrap();
        let body = serde_json::to_string(&LookupRequest {
            vehicle_id: id.as_str(),
        })
        .unwrap();
        assert_eq!(body, r#"{"vehicleId":"veh_3"}"#);
    }
}
