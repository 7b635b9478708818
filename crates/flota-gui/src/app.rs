//! Main application structure wiring the panels together

use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use eframe::egui;
use flota_app::config::Config;
use flota_app::search::SearchService;
use flota_app::session::ServiceSession;
use flota_types::CredentialError;

use crate::map_panel::{MapPanel, FLY_TO_SPEED, FLY_TO_ZOOM};
use crate::search_panel::SearchPanel;

/// Main application state
pub struct FlotaApp {
    config: Config,
    search_panel: SearchPanel,
    map_panel: MapPanel,
    /// Pending startup worker; cleared once the session resolves.
    session_rx: Option<Receiver<Result<ServiceSession, CredentialError>>>,
}

impl FlotaApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = Config::load().unwrap_or_default();

        // Credential acquisition and style resolution happen once, off the
        // UI thread; the map stays blank until they resolve.
        let (tx, rx) = channel();
        let startup_config = config.clone();
        thread::spawn(move || {
            let _ = tx.send(ServiceSession::establish_from_config(&startup_config));
        });

        let map_panel = MapPanel::new(config.default_center_point(), config.default_zoom);

        Self {
            config,
            search_panel: SearchPanel::new(),
            map_panel,
            session_rx: Some(rx),
        }
    }

    fn poll_session(&mut self, ctx: &egui::Context) {
        let Some(rx) = &self.session_rx else { return };
        match rx.try_recv() {
            Ok(Ok(session)) => {
                match SearchService::from_config(&self.config, session.credentials.clone()) {
                    Ok(service) => self.search_panel.set_service(Arc::new(service)),
                    Err(err) => self.search_panel.fail_startup(err.to_string()),
                }
                self.map_panel.set_style(ctx, session.style.tile_template.clone());
                self.session_rx = None;
            }
            Ok(Err(err)) => {
                tracing::error!("startup failed: {err}");
                self.search_panel.fail_startup(err.to_string());
                self.map_panel.fail_initialization(err.to_string());
                self.session_rx = None;
            }
            Err(TryRecvError::Empty) => {
                ctx.request_repaint();
            }
            Err(TryRecvError::Disconnected) => {
                self.search_panel
                    .fail_startup("startup worker disappeared".to_string());
                self.session_rx = None;
            }
        }
    }
}

impl eframe::App for FlotaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_session(ctx);

        egui::SidePanel::left("search_panel")
            .min_width(280.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                self.search_panel.ui(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.map_panel.ui(ui);
        });

        // A search applied this frame moves the marker and the viewport;
        // exactly one fly-to per completed search.
        if let Some(point) = self.search_panel.take_focus() {
            self.map_panel.upsert_marker(point);
            self.map_panel.fly_to(point, FLY_TO_ZOOM, FLY_TO_SPEED);
        }
    }
}
