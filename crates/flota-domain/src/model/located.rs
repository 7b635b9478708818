//! Assembled result of one successful search

use flota_types::VehiclePosition;
use serde::{Deserialize, Serialize};

/// A vehicle position joined with its reverse-geocoded address label.
///
/// The address is always resolved before this value exists; consumers
/// never see a partially assembled result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatedVehicle {
    pub position: VehiclePosition,
    pub address: String,
}
