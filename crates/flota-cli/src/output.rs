//! Output formatting module

use flota_domain::model::LocatedVehicle;
use flota_domain::service::ResultCard;
use flota_types::{OutputFormat, Result};

pub fn output_located(output_format: OutputFormat, located: &LocatedVehicle) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(located)?;
        println!("{}", content);
    } else {
        print!("{}", render_table(located));
    }

    Ok(())
}

fn render_table(located: &LocatedVehicle) -> String {
    let card = ResultCard::from_located(located);

    let mut out = String::new();
    out.push_str(&format!("\nVehicle {}\n", card.device_id));
    out.push_str("================\n");
    out.push_str(&format!("Position:     {}\n", card.lat_lon));
    out.push_str(&format!("Heading:      {}° {}\n", card.angle, card.compass));
    out.push_str(&format!("Address:      {}\n", card.address));
    for (label, value) in &card.telemetry {
        out.push_str(&format!("{:<13} {}\n", format!("{label}:"), value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flota_types::VehiclePosition;

    #[test]
    fn table_carries_the_card_fields() {
        let located = LocatedVehicle {
            position: VehiclePosition {
                device_id: "veh_3".to_string(),
                lon: -75.589,
                lat: 6.208,
                ang: 45.0,
                timestamp: None,
                speed: Some(38.0),
                fuel: None,
                temperature: None,
                odometer: None,
            },
            address: "Cra. 43A, Medellín".to_string(),
        };

        let table = render_table(&located);
        assert!(table.contains("Vehicle veh_3"));
        assert!(table.contains("6.208000, -75.589000"));
        assert!(table.contains("45.00° NE"));
        assert!(table.contains("Cra. 43A, Medellín"));
        assert!(table.contains("Speed:        38.0 km/h"));
    }
}
