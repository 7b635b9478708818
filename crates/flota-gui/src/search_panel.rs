//! Search panel: vehicle id input, search trigger, result card
//!
//! Searches run on worker threads and report back over a channel. Each
//! search carries the generation it was started with; completions whose
//! generation is no longer current are discarded, so overlapping searches
//! cannot race for the final render.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use eframe::egui::{self, Color32, RichText, Ui};
use flota_app::search::SearchService;
use flota_domain::model::LocatedVehicle;
use flota_domain::service::ResultCard;
use flota_types::GeoPoint;

enum SearchOutcome {
    Completed {
        generation: u64,
        located: LocatedVehicle,
    },
    Failed {
        generation: u64,
        message: String,
    },
}

pub struct SearchPanel {
    input: String,
    /// Wired once the startup session is established.
    service: Option<Arc<SearchService>>,
    startup_error: Option<String>,
    result: Option<LocatedVehicle>,
    error: Option<String>,
    in_flight: usize,
    outcome_tx: Sender<SearchOutcome>,
    outcome_rx: Receiver<SearchOutcome>,
    focus_request: Option<GeoPoint>,
}

impl SearchPanel {
    pub fn new() -> Self {
        let (outcome_tx, outcome_rx) = channel();
        Self {
            input: String::new(),
            service: None,
            startup_error: None,
            result: None,
            error: None,
            in_flight: 0,
            outcome_tx,
            outcome_rx,
            focus_request: None,
        }
    }

    pub fn set_service(&mut self, service: Arc<SearchService>) {
        self.service = Some(service);
    }

    pub fn fail_startup(&mut self, message: String) {
        self.startup_error = Some(message);
    }

    /// Fly-to target produced by a search applied this frame, if any.
    pub fn take_focus(&mut self) -> Option<GeoPoint> {
        self.focus_request.take()
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        self.poll_outcomes(ui.ctx());

        ui.heading("Vehicle search");
        ui.add_space(10.0);

        let ready = self.service.is_some();
        ui.horizontal(|ui| {
            let response = ui.add_enabled(
                ready,
                egui::TextEdit::singleline(&mut self.input)
                    .hint_text("veh_1 … veh_20")
                    .desired_width(140.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.search();
            }
            if ui.add_enabled(ready, egui::Button::new("Search")).clicked() {
                self.search();
            }
            if self.in_flight > 0 {
                ui.spinner();
            }
        });

        if let Some(startup_error) = &self.startup_error {
            ui.add_space(10.0);
            ui.label(
                RichText::new(format!("Startup failed: {startup_error}"))
                    .color(Color32::LIGHT_RED),
            );
        } else if !ready {
            ui.add_space(10.0);
            ui.label(
                RichText::new("Connecting to the location services…")
                    .italics()
                    .color(Color32::GRAY),
            );
        }

        self.render_result(ui);
        self.render_error(ui);
    }

    fn poll_outcomes(&mut self, ctx: &egui::Context) {
        let Some(service) = &self.service else { return };

        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            match outcome {
                SearchOutcome::Completed {
                    generation,
                    located,
                } => {
                    if service.is_current(generation) {
                        self.focus_request = Some(located.position.point());
                        self.result = Some(located);
                        self.error = None;
                    } else {
                        tracing::debug!(generation, "discarding stale search result");
                    }
                }
                SearchOutcome::Failed {
                    generation,
                    message,
                } => {
                    if service.is_current(generation) {
                        self.error = Some(message);
                    }
                }
            }
        }

        if self.in_flight > 0 {
            ctx.request_repaint();
        }
    }

    fn search(&mut self) {
        let raw = self.input.trim().to_string();
        if raw.is_empty() {
            return;
        }
        let Some(service) = &self.service else { return };

        let generation = service.begin();
        let service = Arc::clone(service);
        let tx = self.outcome_tx.clone();
        self.in_flight += 1;

        thread::spawn(move || {
            let outcome = match service.locate(&raw) {
                Ok(located) => SearchOutcome::Completed {
                    generation,
                    located,
                },
                Err(err) => SearchOutcome::Failed {
                    generation,
                    message: err.to_string(),
                },
            };
            let _ = tx.send(outcome);
        });
    }

    fn render_result(&self, ui: &mut Ui) {
        let Some(result) = &self.result else { return };
        let card = ResultCard::from_located(result);

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        ui.label(RichText::new("Last known position").strong());
        ui.add_space(5.0);

        egui::Grid::new("result_card")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                ui.label("Device:");
                ui.label(RichText::new(&card.device_id).monospace());
                ui.end_row();

                ui.label("Position:");
                ui.label(RichText::new(&card.lat_lon).monospace());
                ui.end_row();

                ui.label("Heading:");
                ui.label(format!("{}° {}", card.angle, card.compass));
                ui.end_row();

                ui.label("Address:");
                ui.label(&card.address);
                ui.end_row();

                for (label, value) in &card.telemetry {
                    ui.label(format!("{label}:"));
                    ui.label(value);
                    ui.end_row();
                }
            });
    }

    fn render_error(&self, ui: &mut Ui) {
        let Some(error) = &self.error else { return };
        ui.add_space(10.0);
        ui.label(RichText::new(error).color(Color32::LIGHT_RED));
    }
}

impl Default for SearchPanel {
    fn default() -> Self {
        Self::new()
    }
}
