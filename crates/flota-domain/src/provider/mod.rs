//! Service provider traits implemented by the infrastructure layer
//!
//! The locator consumes four external services. Each gets a narrow trait
//! so the application layer can be exercised with in-memory fakes.

use flota_types::{
    CredentialError, Credentials, LookupError, StyleDescriptor, VehicleId, VehiclePosition,
};

/// Label returned when the place index has no result for a position.
pub const ADDRESS_UNAVAILABLE: &str = "address unavailable";

/// Label returned when the place index call fails outright.
pub const ADDRESS_SERVICE_ERROR: &str = "service error";

/// Exchanges the configured identity pool for temporary read credentials.
///
/// Called once at startup. Failure halts map initialization; there is no
/// fallback mode and no retry.
pub trait CredentialProvider: Send + Sync {
    fn acquire(&self) -> Result<Credentials, CredentialError>;
}

/// Resolves the signed style descriptor for a named map resource.
pub trait StyleProvider: Send + Sync {
    fn style_descriptor(
        &self,
        map_name: &str,
        credentials: &Credentials,
    ) -> Result<StyleDescriptor, CredentialError>;
}

/// Fetches the last known position of a vehicle from the fleet backend.
pub trait PositionLookup: Send + Sync {
    fn latest_position(&self, id: &VehicleId) -> Result<VehiclePosition, LookupError>;
}

/// Resolves coordinates to an address label.
///
/// Implementations never fail past this boundary: an empty result set
/// yields [`ADDRESS_UNAVAILABLE`] and a failed query yields
/// [`ADDRESS_SERVICE_ERROR`].
pub trait ReverseGeocoder: Send + Sync {
    fn resolve_address(&self, lon: f64, lat: f64) -> String;
}
