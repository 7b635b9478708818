//! Command handlers

use std::time::Duration;

use flota_app::config::Config;
use flota_app::search::SearchService;
use flota_domain::provider::CredentialProvider;
use flota_infra::http;
use flota_infra::identity::IdentityClient;
use flota_types::{LookupError, OutputFormat, Result, VehicleId};
use indicatif::ProgressBar;

use crate::cli::{Cli, Commands};
use crate::output::output_located;

pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Locate { vehicle_id, format } => locate(&vehicle_id, format),
        Commands::Config => {
            let config = Config::load()?;
            print!("{config}");
            Ok(())
        }
    }
}

fn locate(raw_id: &str, format: Option<OutputFormat>) -> Result<()> {
    let config = Config::load()?;
    let format = format.unwrap_or(config.output_format);

    // Reject malformed ids before any network traffic.
    let id = VehicleId::parse(raw_id).map_err(flota_types::Error::from)?;

    let spinner = progress_spinner(format!("Locating {id}…"));

    let http = http::client()
        .map_err(|err| LookupError::Transport(err.to_string()))
        .map_err(flota_types::Error::from)?;
    let identity = IdentityClient::new(
        http,
        config.identity_endpoint(),
        config.identity_pool_id.clone(),
    );
    let credentials = identity.acquire().map_err(flota_types::Error::from)?;

    let service =
        SearchService::from_config(&config, credentials).map_err(flota_types::Error::from)?;
    let located = service.locate(id.as_str()).map_err(flota_types::Error::from)?;

    spinner.finish_and_clear();
    output_located(format, &located)
}

fn progress_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
