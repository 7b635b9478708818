//! Startup session: one-time credential acquisition and style resolution

use flota_domain::provider::{CredentialProvider, StyleProvider};
use flota_infra::http;
use flota_infra::identity::IdentityClient;
use flota_infra::style::StyleClient;
use flota_types::{CredentialError, Credentials, StyleDescriptor};

use crate::config::Config;

/// Everything the credentialed services need, established once at startup.
///
/// Write-once: the session is built before the first render and read-only
/// afterwards. Establishing it is fatal on failure; the map is never shown
/// without one.
#[derive(Debug, Clone)]
pub struct ServiceSession {
    pub credentials: Credentials,
    pub style: StyleDescriptor,
}

impl ServiceSession {
    pub fn establish(
        provider: &dyn CredentialProvider,
        styles: &dyn StyleProvider,
        map_name: &str,
    ) -> Result<Self, CredentialError> {
        let credentials = provider.acquire()?;
        let style = styles.style_descriptor(map_name, &credentials)?;
        tracing::info!(map = map_name, "service session established");
        Ok(Self { credentials, style })
    }

    /// Build the HTTP adapters from configuration and establish the session.
    pub fn establish_from_config(config: &Config) -> Result<Self, CredentialError> {
        let http =
            http::client().map_err(|err| CredentialError::Transport(err.to_string()))?;
        let identity = IdentityClient::new(
            http.clone(),
            config.identity_endpoint(),
            config.identity_pool_id.clone(),
        );
        let styles = StyleClient::new(http, config.style_endpoint());
        Self::establish(&identity, &styles, &config.map_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProvider {
        fail: bool,
        calls: AtomicUsize,
    }

    impl CredentialProvider for FakeProvider {
        fn acquire(&self) -> Result<Credentials, CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CredentialError::Http {
                    status: 400,
                    message: "pool not found".to_string(),
                });
            }
            Ok(Credentials {
                access_key_id: "AKID".to_string(),
                secret_key: "secret".to_string(),
                session_token: "token".to_string(),
                expiration: None,
            })
        }
    }

    struct FakeStyles {
        calls: AtomicUsize,
    }

    impl StyleProvider for FakeStyles {
        fn style_descriptor(
            &self,
            map_name: &str,
            _credentials: &Credentials,
        ) -> Result<StyleDescriptor, CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StyleDescriptor {
                tile_template: format!("https://tiles.example/{map_name}/{{z}}/{{x}}/{{y}}"),
            })
        }
    }

    #[test]
    fn establishes_credentials_then_style() {
        let provider = FakeProvider {
            fail: false,
            calls: AtomicUsize::new(0),
        };
        let styles = FakeStyles {
            calls: AtomicUsize::new(0),
        };

        let session = ServiceSession::establish(&provider, &styles, "SUMO-Fleet-Map").unwrap();
        assert!(session.style.tile_template.contains("SUMO-Fleet-Map"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(styles.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn credential_failure_halts_before_style_resolution() {
        let provider = FakeProvider {
            fail: true,
            calls: AtomicUsize::new(0),
        };
        let styles = FakeStyles {
            calls: AtomicUsize::new(0),
        };

        let err = ServiceSession::establish(&provider, &styles, "SUMO-Fleet-Map").unwrap_err();
        assert!(matches!(err, CredentialError::Http { status: 400, .. }));
        assert_eq!(styles.calls.load(Ordering::SeqCst), 0);
    }
}
