//! Search use case: validate, look up, reverse-geocode
//!
//! One invocation is strictly sequential: the geocode query is issued only
//! after the lookup resolves, and a result exists only once its address is
//! known. Overlapping invocations are arbitrated by a generation counter:
//! whoever finishes with a stale generation is discarded instead of racing
//! for the final render.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use flota_domain::model::LocatedVehicle;
use flota_domain::provider::{PositionLookup, ReverseGeocoder};
use flota_infra::geocode::PlaceIndexClient;
use flota_infra::http;
use flota_infra::lookup::FleetApiClient;
use flota_types::{Credentials, LookupError, VehicleId};

use crate::config::Config;

pub struct SearchService {
    lookup: Arc<dyn PositionLookup>,
    geocoder: Arc<dyn ReverseGeocoder>,
    generation: AtomicU64,
}

impl SearchService {
    pub fn new(lookup: Arc<dyn PositionLookup>, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        Self {
            lookup,
            geocoder,
            generation: AtomicU64::new(0),
        }
    }

    /// Wire the concrete backend and place-index clients from configuration.
    pub fn from_config(config: &Config, credentials: Credentials) -> Result<Self, LookupError> {
        let http = http::client().map_err(|err| LookupError::Transport(err.to_string()))?;
        let lookup = FleetApiClient::new(
            http.clone(),
            config.api_base_url.clone(),
            config.api_key.clone(),
        );
        let geocoder = PlaceIndexClient::new(
            http,
            config.places_endpoint(),
            config.place_index_name.clone(),
            credentials,
        );
        Ok(Self::new(Arc::new(lookup), Arc::new(geocoder)))
    }

    /// Start a new search, invalidating any still-running one.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a finished search's result should still be applied.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Run one search invocation end to end.
    pub fn locate(&self, raw_id: &str) -> Result<LocatedVehicle, LookupError> {
        let id = VehicleId::parse(raw_id)?;
        let position = self.lookup.latest_position(&id)?;
        let address = self.geocoder.resolve_address(position.lon, position.lat);
        Ok(LocatedVehicle { position, address })
    }
}
