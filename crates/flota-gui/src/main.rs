//! GUI entry point for the flota fleet locator

mod app;
mod map_panel;
mod search_panel;

use app::FlotaApp;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Flota - Fleet Vehicle Locator",
        options,
        Box::new(|cc| Ok(Box::new(FlotaApp::new(cc)))),
    )
}
