//! Map style resolution: named map in, signed tile template out

use flota_domain::provider::StyleProvider;
use flota_types::{CredentialError, Credentials, StyleDescriptor};
use reqwest::blocking::Client;

use crate::identity::error_message;

/// Client for the map-style service.
///
/// The style document is fetched with the acquired credentials and only
/// its first raster tile template is kept; everything else about the
/// style is the renderer's concern.
pub struct StyleClient {
    endpoint: String,
    http: Client,
}

impl StyleClient {
    pub fn new(http: Client, endpoint: String) -> Self {
        Self { endpoint, http }
    }
}

impl StyleProvider for StyleClient {
    fn style_descriptor(
        &self,
        map_name: &str,
        credentials: &Credentials,
    ) -> Result<StyleDescriptor, CredentialError> {
        let url = format!(
            "{}/{map_name}/style-descriptor",
            self.endpoint.trim_end_matches('/')
        );
        tracing::debug!(%url, "resolving style descriptor");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("key", credentials.access_key_id.as_str()),
                ("token", credentials.session_token.as_str()),
            ])
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

        let style: serde_json::Value =
            serde_json::from_str(&body).map_err(|err| CredentialError::Schema(err.to_string()))?;
        let tile_template = extract_tile_template(&style).ok_or_else(|| {
            CredentialError::Schema("style document has no raster tile source".to_string())
        })?;

        Ok(StyleDescriptor { tile_template })
    }
}

/// Pull the first raster tile URL template out of a style document.
///
/// Accepts both a full style (`sources.<name>.tiles`) and a bare
/// `{"tiles": [...]}` document.
fn extract_tile_template(style: &serde_json::Value) -> Option<String> {
    let first_of = |value: &serde_json::Value| {
        value
            .get("tiles")?
            .as_array()?
            .first()?
            .as_str()
            .map(str::to_string)
    };

    if let Some(sources) = style.get("sources").and_then(|s| s.as_object()) {
        for source in sources.values() {
            if source.get("type").and_then(|t| t.as_str()) == Some("raster") {
                if let Some(template) = first_of(source) {
                    return Some(template);
                }
            }
        }
    }
    first_of(style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_the_raster_source_template() {
        let style = json!({
            "version": 8,
            "sources": {
                "esri": {
                    "type": "raster",
                    "tiles": ["https://tiles.example/{z}/{x}/{y}?sig=abc"],
                    "tileSize": 256
                }
            }
        });
        assert_eq!(
            extract_tile_template(&style).unwrap(),
            "https://tiles.example/{z}/{x}/{y}?sig=abc"
        );
    }

    #[test]
    fn skips_non_raster_sources() {
        let style = json!({
            "sources": {
                "vec": { "type": "vector", "tiles": ["https://vec.example/{z}/{x}/{y}"] }
            }
        });
        assert_eq!(extract_tile_template(&style), None);
    }

    #[test]
    fn accepts_a_bare_tiles_document() {
        let style = json!({ "tiles": ["https://bare.example/{z}/{x}/{y}.png"] });
        assert_eq!(
            extract_tile_template(&style).unwrap(),
            "https://bare.example/{z}/{x}/{y}.png"
        );
    }
}
