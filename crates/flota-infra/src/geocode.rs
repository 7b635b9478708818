//! Reverse geocoding against the place index

use flota_domain::provider::{ReverseGeocoder, ADDRESS_SERVICE_ERROR, ADDRESS_UNAVAILABLE};
use flota_types::{Credentials, GeocodeError};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::identity::error_message;

/// Client for the reverse-geocoding place index.
pub struct PlaceIndexClient {
    endpoint: String,
    index_name: String,
    credentials: Credentials,
    http: Client,
}

#[derive(Serialize)]
struct PositionQuery {
    #[serde(rename = "Position")]
    position: [f64; 2],
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "Results", default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(rename = "Place")]
    place: Place,
}

#[derive(Deserialize)]
struct Place {
    #[serde(rename = "Label")]
    label: Option<String>,
}

impl PlaceIndexClient {
    pub fn new(http: Client, endpoint: String, index_name: String, credentials: Credentials) -> Self {
        Self {
            endpoint,
            index_name,
            credentials,
            http,
        }
    }

    fn search(&self, lon: f64, lat: f64) -> Result<SearchResponse, GeocodeError> {
        let url = format!(
            "{}/indexes/{}/search/position",
            self.endpoint.trim_end_matches('/'),
            self.index_name
        );

        let response = self
            .http
            .post(&url)
            .query(&[
                ("key", self.credentials.access_key_id.as_str()),
                ("token", self.credentials.session_token.as_str()),
            ])
            .json(&PositionQuery {
                position: [lon, lat],
            })
            .send()
            .map_err(|err| GeocodeError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| GeocodeError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(GeocodeError::Http {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason().unwrap_or("error")),
            });
        }

        serde_json::from_str(&body).map_err(|err| GeocodeError::Schema(err.to_string()))
    }
}

impl ReverseGeocoder for PlaceIndexClient {
    fn resolve_address(&self, lon: f64, lat: f64) -> String {
        match self.search(lon, lat) {
            Ok(response) => first_label(response),
            Err(err) => {
                tracing::warn!("reverse geocoding failed: {err}");
                ADDRESS_SERVICE_ERROR.to_string()
            }
        }
    }
}

/// First result's label, or the unavailable sentinel for an empty set.
fn first_label(response: SearchResponse) -> String {
    response
        .results
        .into_iter()
        .next()
        .and_then(|result| result.place.label)
        .unwrap_or_else(|| ADDRESS_UNAVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_result_wins() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"Results":[
                {"Place":{"Label":"Cra. 43A #1-50, Medellín"}},
                {"Place":{"Label":"Somewhere else"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(first_label(response), "Cra. 43A #1-50, Medellín");
    }

    #[test]
    fn empty_result_set_degrades_to_the_sentinel() {
        let response: SearchResponse = serde_json::from_str(r#"{"Results":[]}"#).unwrap();
        assert_eq!(first_label(response), ADDRESS_UNAVAILABLE);

        let no_field: SearchResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(first_label(no_field), ADDRESS_UNAVAILABLE);
    }

    #[test]
    fn result_without_a_label_degrades_to_the_sentinel() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"Results":[{"Place":{}}]}"#).unwrap();
        assert_eq!(first_label(response), ADDRESS_UNAVAILABLE);
    }
}
