//! Result-card rendering shared by the GUI and the CLI

use crate::model::LocatedVehicle;

/// Coordinates as shown on the card: latitude first, six decimal places.
pub fn format_lat_lon(lat: f64, lon: f64) -> String {
    format!("{lat:.6}, {lon:.6}")
}

/// Heading angle as shown on the card, two decimal places.
pub fn format_angle(ang: f64) -> String {
    format!("{ang:.2}")
}

/// Eight-way compass label for a heading in degrees clockwise from north.
///
/// Any finite angle is accepted; it is normalized into [0, 360).
pub fn compass_label(ang: f64) -> &'static str {
    const LABELS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let normalized = ang.rem_euclid(360.0);
    let sector = ((normalized + 22.5) / 45.0) as usize % 8;
    LABELS[sector]
}

/// Display strings for one located vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    pub device_id: String,
    pub lat_lon: String,
    pub angle: String,
    pub compass: &'static str,
    pub address: String,
    /// Telemetry rows present on the record, as (label, value) pairs.
    pub telemetry: Vec<(&'static str, String)>,
}

impl ResultCard {
    pub fn from_located(located: &LocatedVehicle) -> Self {
        let position = &located.position;

        let mut telemetry = Vec::new();
        if let Some(sampled) = position.sampled_at() {
            telemetry.push(("Sampled", sampled.format("%Y-%m-%d %H:%M:%S UTC").to_string()));
        }
        if let Some(speed) = position.speed {
            telemetry.push(("Speed", format!("{speed:.1} km/h")));
        }
        if let Some(fuel) = position.fuel {
            telemetry.push(("Fuel", format!("{fuel:.0}%")));
        }
        if let Some(temperature) = position.temperature {
            telemetry.push(("Engine temp", format!("{temperature:.1} °C")));
        }
        if let Some(odometer) = position.odometer {
            telemetry.push(("Odometer", format!("{odometer:.0} km")));
        }

        Self {
            device_id: position.device_id.clone(),
            lat_lon: format_lat_lon(position.lat, position.lon),
            angle: format_angle(position.ang),
            compass: compass_label(position.ang),
            address: located.address.clone(),
            telemetry,
        }
    }
}
