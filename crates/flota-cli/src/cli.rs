//! Command-line interface definition

use clap::{Parser, Subcommand};
use flota_types::OutputFormat;

#[derive(Parser)]
#[command(name = "flota", version, about = "Locate fleet vehicles on the fleet backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up the last known position of a vehicle
    Locate {
        /// Vehicle identifier (veh_1 through veh_20)
        vehicle_id: String,

        /// Output format override
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show the active configuration
    Config,
}
