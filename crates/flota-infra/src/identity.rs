//! Identity exchange: pool identifier in, temporary credentials out

use chrono::{DateTime, TimeZone, Utc};
use flota_domain::provider::CredentialProvider;
use flota_types::{CredentialError, Credentials};
use reqwest::blocking::Client;
use serde::Deserialize;

/// Client for the identity service.
///
/// Exchanges the configured pool identifier for temporary, unauthenticated
/// read credentials scoped to the pool's region. Used once at startup.
pub struct IdentityClient {
    endpoint: String,
    pool_id: String,
    http: Client,
}

#[derive(serde::Serialize)]
struct ExchangeRequest<'a> {
    #[serde(rename = "IdentityPoolId")]
    identity_pool_id: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    #[serde(rename = "Credentials")]
    credentials: WireCredentials,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireCredentials {
    access_key_id: String,
    secret_key: String,
    session_token: String,
    /// Epoch seconds; the service emits it as a float.
    expiration: Option<f64>,
}

impl IdentityClient {
    pub fn new(http: Client, endpoint: String, pool_id: String) -> Self {
        Self {
            endpoint,
            pool_id,
            http,
        }
    }
}

impl CredentialProvider for IdentityClient {
    fn acquire(&self) -> Result<Credentials, CredentialError> {
        tracing::debug!(endpoint = %self.endpoint, "exchanging identity pool for credentials");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&ExchangeRequest {
                identity_pool_id: &self.pool_id,
            })
            .send()
            .map_err(|err| CredentialError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| CredentialError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(CredentialError::Http {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason().unwrap_or("error")),
            });
        }

        let exchange: ExchangeResponse =
            serde_json::from_str(&body).map_err(|err| CredentialError::Schema(err.to_string()))?;

        tracing::info!("acquired temporary credentials");
        Ok(into_credentials(exchange.credentials))
    }
}

fn into_credentials(wire: WireCredentials) -> Credentials {
    Credentials {
        access_key_id: wire.access_key_id,
        secret_key: wire.secret_key,
        session_token: wire.session_token,
        expiration: wire.expiration.and_then(expiration_to_datetime),
    }
}

fn expiration_to_datetime(epoch_seconds: f64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(epoch_seconds as i64, 0).single()
}

/// Extract a human-readable message from a JSON error body, falling back
/// to the HTTP reason phrase.
pub(crate) fn error_message(body: &str, fallback: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(alias = "message", alias = "Message")]
        error: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .unwrap_or_else(|| fallback.to_string())
}
