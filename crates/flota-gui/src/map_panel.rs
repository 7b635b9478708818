//! Interactive map panel: raster tiles, pan/zoom, fly-to, single marker

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, Ui,
    Vec2,
};
use flota_infra::tiles::{TileClient, TileId};
use flota_types::GeoPoint;

const TILE_SIZE: f64 = 256.0;
const MIN_ZOOM: f64 = 2.0;
const MAX_ZOOM: f64 = 18.0;
const MAX_TILE_ZOOM: u8 = 19;
const MAX_LATITUDE: f64 = 85.05112878;

/// Wheel pixels to zoom-level conversion.
const ZOOM_WHEEL_RATE: f64 = 0.005;

/// Fly-to target zoom and speed applied after a successful search.
pub const FLY_TO_ZOOM: f64 = 14.0;
pub const FLY_TO_SPEED: f64 = 1.5;

const MARKER_COLOR: Color32 = Color32::from_rgb(0xff, 0x45, 0x00);

// ---------------------------------------------------------------------------
// Projection / viewport math (pure functions, easily testable)
// ---------------------------------------------------------------------------

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Web-mercator projection of a lon/lat point into world pixels at a zoom.
fn project(point: GeoPoint, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let x = (point.lon + 180.0) / 360.0 * size;
    let lat_rad = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0 * size;
    (x, y)
}

/// Inverse of [`project`].
fn unproject(x: f64, y: f64, zoom: f64) -> GeoPoint {
    let size = world_size(zoom);
    let lon = x / size * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / size);
    GeoPoint {
        lon,
        lat: n.sinh().atan().to_degrees(),
    }
}

/// Shift the viewport center so a screen drag keeps the map under the cursor.
fn pan_center(center: GeoPoint, zoom: f64, drag_delta: (f64, f64)) -> GeoPoint {
    let (cx, cy) = project(center, zoom);
    unproject(cx - drag_delta.0, cy - drag_delta.1, zoom)
}

/// Change zoom while the geographic point at `anchor_offset` (screen px
/// relative to the viewport center) stays put.
fn zoom_preserving_anchor(
    center: GeoPoint,
    old_zoom: f64,
    new_zoom: f64,
    anchor_offset: (f64, f64),
) -> GeoPoint {
    let (cx, cy) = project(center, old_zoom);
    let anchor = unproject(cx + anchor_offset.0, cy + anchor_offset.1, old_zoom);
    let (ax, ay) = project(anchor, new_zoom);
    unproject(ax - anchor_offset.0, ay - anchor_offset.1, new_zoom)
}

/// Integer tile zoom plus the tiles covering a `width`×`height` viewport.
fn visible_tiles(center: GeoPoint, zoom: f64, width: f64, height: f64) -> (u8, Vec<TileId>) {
    let tile_zoom = zoom.round().clamp(0.0, MAX_TILE_ZOOM as f64) as u8;
    let scale = 2f64.powf(zoom - tile_zoom as f64);
    let (cx, cy) = project(center, tile_zoom as f64);
    let half_w = width / (2.0 * scale);
    let half_h = height / (2.0 * scale);
    let max_index = (1i64 << tile_zoom) - 1;

    let index_range = |lo: f64, hi: f64| {
        let lo = ((lo / TILE_SIZE).floor() as i64).clamp(0, max_index);
        let hi = ((hi / TILE_SIZE).floor() as i64).clamp(0, max_index);
        lo..=hi
    };

    let mut tiles = Vec::new();
    for x in index_range(cx - half_w, cx + half_w) {
        for y in index_range(cy - half_h, cy + half_h) {
            tiles.push(TileId {
                zoom: tile_zoom,
                x: x as u32,
                y: y as u32,
            });
        }
    }
    (tile_zoom, tiles)
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Eased interpolation between two cameras; `t` is clamped to [0, 1] and
/// `t = 1` lands exactly on the target.
fn interpolate_camera(
    from: (GeoPoint, f64),
    to: (GeoPoint, f64),
    t: f64,
) -> (GeoPoint, f64) {
    let k = smoothstep(t.clamp(0.0, 1.0));
    (
        GeoPoint {
            lon: from.0.lon + (to.0.lon - from.0.lon) * k,
            lat: from.0.lat + (to.0.lat - from.0.lat) * k,
        },
        from.1 + (to.1 - from.1) * k,
    )
}

// ---------------------------------------------------------------------------
// Fly-to animation
// ---------------------------------------------------------------------------

struct FlyTo {
    from: (GeoPoint, f64),
    to: (GeoPoint, f64),
    progress: f64,
    speed: f64,
}

impl FlyTo {
    /// Advance by `dt` seconds; returns the camera and whether it is done.
    fn advance(&mut self, dt: f64) -> ((GeoPoint, f64), bool) {
        self.progress += dt * self.speed / 2.0;
        let camera = interpolate_camera(self.from, self.to, self.progress);
        (camera, self.progress >= 1.0)
    }
}

// ---------------------------------------------------------------------------
// Tile worker
// ---------------------------------------------------------------------------

enum TileMessage {
    Loaded(TileId, egui::ColorImage),
    Failed(TileId),
}

struct TileWorker {
    request_tx: Sender<TileId>,
    message_rx: Receiver<TileMessage>,
    textures: HashMap<TileId, TextureHandle>,
    pending: HashSet<TileId>,
    failed: HashSet<TileId>,
}

enum TileLayer {
    /// Waiting for the startup session; no map is rendered yet.
    Initializing,
    Ready(TileWorker),
    /// Credential acquisition or style resolution failed; fatal.
    Failed(String),
}

/// Interactive map with a single reusable marker.
pub struct MapPanel {
    center: GeoPoint,
    zoom: f64,
    marker: Option<GeoPoint>,
    fly_to: Option<FlyTo>,
    layer: TileLayer,
}

impl MapPanel {
    pub fn new(center: GeoPoint, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            marker: None,
            fly_to: None,
            layer: TileLayer::Initializing,
        }
    }

    /// Attach the resolved tile template and start the fetch worker.
    pub fn set_style(&mut self, ctx: &egui::Context, template: String) {
        let http = match flota_infra::http::client() {
            Ok(client) => client,
            Err(err) => {
                self.layer = TileLayer::Failed(err.to_string());
                return;
            }
        };

        let (request_tx, request_rx) = channel::<TileId>();
        let (message_tx, message_rx) = channel::<TileMessage>();
        let client = TileClient::new(http);
        let ctx = ctx.clone();

        thread::spawn(move || {
            while let Ok(tile) = request_rx.recv() {
                let message = match client.fetch(&template, tile) {
                    Ok(rgba) => {
                        let size = [rgba.width() as usize, rgba.height() as usize];
                        let pixels = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                        TileMessage::Loaded(tile, pixels)
                    }
                    Err(err) => {
                        tracing::warn!("tile {tile:?} fetch failed: {err}");
                        TileMessage::Failed(tile)
                    }
                };
                if message_tx.send(message).is_err() {
                    break;
                }
                ctx.request_repaint();
            }
        });

        self.layer = TileLayer::Ready(TileWorker {
            request_tx,
            message_rx,
            textures: HashMap::new(),
            pending: HashSet::new(),
            failed: HashSet::new(),
        });
    }

    /// Mark startup as failed; the map is never rendered without credentials.
    pub fn fail_initialization(&mut self, message: String) {
        self.layer = TileLayer::Failed(message);
    }

    /// Create the marker on first use, reposition it afterwards.
    pub fn upsert_marker(&mut self, point: GeoPoint) {
        self.marker = Some(point);
    }

    /// Animated viewport move; fire-and-forget, no completion signal.
    pub fn fly_to(&mut self, center: GeoPoint, zoom: f64, speed: f64) {
        self.fly_to = Some(FlyTo {
            from: (self.center, self.zoom),
            to: (center, zoom.clamp(MIN_ZOOM, MAX_ZOOM)),
            progress: 0.0,
            speed,
        });
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(18));

        match &self.layer {
            TileLayer::Initializing => {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "Initializing map…",
                    FontId::proportional(14.0),
                    Color32::GRAY,
                );
                return;
            }
            TileLayer::Failed(message) => {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    format!("Map unavailable: {message}"),
                    FontId::proportional(14.0),
                    Color32::LIGHT_RED,
                );
                return;
            }
            TileLayer::Ready(_) => {}
        }

        self.advance_fly_to(ui);
        self.handle_input(ui, rect, &response);
        self.drain_tile_messages(ui.ctx());
        self.draw_tiles(&painter, rect);
        self.draw_marker(&painter, rect);
        self.nav_controls(ui, rect);
    }

    fn advance_fly_to(&mut self, ui: &Ui) {
        if let Some(fly) = &mut self.fly_to {
            let dt = ui.input(|i| i.stable_dt) as f64;
            let (camera, done) = fly.advance(dt);
            self.center = camera.0;
            self.zoom = camera.1;
            if done {
                self.fly_to = None;
            } else {
                ui.ctx().request_repaint();
            }
        }
    }

    fn handle_input(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if response.dragged() {
            let delta = response.drag_delta();
            self.center = pan_center(self.center, self.zoom, (delta.x as f64, delta.y as f64));
            // user interaction cancels a running fly-to
            self.fly_to = None;
        }

        if let Some(hover) = response.hover_pos() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y) as f64;
            if scroll != 0.0 {
                let old_zoom = self.zoom;
                let new_zoom = (old_zoom + scroll * ZOOM_WHEEL_RATE).clamp(MIN_ZOOM, MAX_ZOOM);
                if new_zoom != old_zoom {
                    let offset = hover - rect.center();
                    self.center = zoom_preserving_anchor(
                        self.center,
                        old_zoom,
                        new_zoom,
                        (offset.x as f64, offset.y as f64),
                    );
                    self.zoom = new_zoom;
                    self.fly_to = None;
                }
            }
        }
    }

    fn drain_tile_messages(&mut self, ctx: &egui::Context) {
        let TileLayer::Ready(worker) = &mut self.layer else {
            return;
        };
        while let Ok(message) = worker.message_rx.try_recv() {
            match message {
                TileMessage::Loaded(tile, pixels) => {
                    let name = format!("tile-{}-{}-{}", tile.zoom, tile.x, tile.y);
                    let texture = ctx.load_texture(name, pixels, TextureOptions::LINEAR);
                    worker.pending.remove(&tile);
                    worker.textures.insert(tile, texture);
                }
                TileMessage::Failed(tile) => {
                    worker.pending.remove(&tile);
                    worker.failed.insert(tile);
                }
            }
        }
    }

    fn draw_tiles(&mut self, painter: &egui::Painter, rect: Rect) {
        let center = self.center;
        let zoom = self.zoom;
        let TileLayer::Ready(worker) = &mut self.layer else {
            return;
        };

        let (tile_zoom, tiles) = visible_tiles(center, zoom, rect.width() as f64, rect.height() as f64);
        let scale = 2f64.powf(zoom - tile_zoom as f64);
        let (cx, cy) = project(center, tile_zoom as f64);

        for tile in tiles {
            let world_x = tile.x as f64 * TILE_SIZE;
            let world_y = tile.y as f64 * TILE_SIZE;
            let min = rect.center()
                + Vec2::new(
                    ((world_x - cx) * scale) as f32,
                    ((world_y - cy) * scale) as f32,
                );
            let tile_rect = Rect::from_min_size(min, Vec2::splat((TILE_SIZE * scale) as f32));

            if let Some(texture) = worker.textures.get(&tile) {
                painter.image(
                    texture.id(),
                    tile_rect,
                    Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            } else if !worker.pending.contains(&tile) && !worker.failed.contains(&tile) {
                worker.pending.insert(tile);
                let _ = worker.request_tx.send(tile);
            }
        }
    }

    fn draw_marker(&self, painter: &egui::Painter, rect: Rect) {
        let Some(marker) = self.marker else { return };

        let (cx, cy) = project(self.center, self.zoom);
        let (mx, my) = project(marker, self.zoom);
        let pos = rect.center() + Vec2::new((mx - cx) as f32, (my - cy) as f32);
        if !rect.expand(16.0).contains(pos) {
            return;
        }

        painter.circle_filled(pos, 7.0, MARKER_COLOR);
        painter.circle_stroke(pos, 7.0, Stroke::new(1.5, Color32::WHITE));
    }

    fn nav_controls(&mut self, ui: &mut Ui, rect: Rect) {
        let size = Vec2::splat(24.0);
        let zoom_in = Rect::from_min_size(rect.left_top() + Vec2::new(8.0, 8.0), size);
        let zoom_out = Rect::from_min_size(rect.left_top() + Vec2::new(8.0, 36.0), size);

        if ui.put(zoom_in, egui::Button::new("+")).clicked() {
            self.zoom = (self.zoom + 1.0).clamp(MIN_ZOOM, MAX_ZOOM);
            self.fly_to = None;
        }
        if ui.put(zoom_out, egui::Button::new("−")).clicked() {
            self.zoom = (self.zoom - 1.0).clamp(MIN_ZOOM, MAX_ZOOM);
            self.fly_to = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medellin() -> GeoPoint {
        GeoPoint {
            lon: -75.589,
            lat: 6.208,
        }
    }

    #[test]
    fn test_project_origin_at_zoom_zero() {
        let (x, y) = project(GeoPoint { lon: 0.0, lat: 0.0 }, 0.0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_unproject_round_trip() {
        for zoom in [2.0, 7.5, 12.0, 18.0] {
            let (x, y) = project(medellin(), zoom);
            let back = unproject(x, y, zoom);
            assert!((back.lon - medellin().lon).abs() < 1e-9);
            assert!((back.lat - medellin().lat).abs() < 1e-9);
        }
    }

    #[test]
    fn test_pan_moves_against_the_drag() {
        // Dragging the map right moves the viewport west
        let panned = pan_center(medellin(), 12.0, (40.0, 0.0));
        assert!(panned.lon < medellin().lon);
        assert!((panned.lat - medellin().lat).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_at_center_keeps_the_center() {
        let zoomed = zoom_preserving_anchor(medellin(), 12.0, 13.0, (0.0, 0.0));
        assert!((zoomed.lon - medellin().lon).abs() < 1e-9);
        assert!((zoomed.lat - medellin().lat).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_keeps_the_anchor_point_fixed() {
        let offset = (120.0, -60.0);
        let (old_zoom, new_zoom) = (10.0, 12.0);

        let (cx, cy) = project(medellin(), old_zoom);
        let anchor = unproject(cx + offset.0, cy + offset.1, old_zoom);

        let new_center = zoom_preserving_anchor(medellin(), old_zoom, new_zoom, offset);
        let (ncx, ncy) = project(new_center, new_zoom);
        let (ax, ay) = project(anchor, new_zoom);
        assert!((ax - ncx - offset.0).abs() < 1e-6);
        assert!((ay - ncy - offset.1).abs() < 1e-6);
    }

    #[test]
    fn test_visible_tiles_at_world_scale() {
        let (tile_zoom, tiles) = visible_tiles(GeoPoint { lon: 0.0, lat: 0.0 }, 0.0, 200.0, 200.0);
        assert_eq!(tile_zoom, 0);
        assert_eq!(
            tiles,
            vec![TileId {
                zoom: 0,
                x: 0,
                y: 0
            }]
        );
    }

    #[test]
    fn test_visible_tiles_cover_the_viewport() {
        let (tile_zoom, tiles) =
            visible_tiles(GeoPoint { lon: 0.0, lat: 0.0 }, 2.0, 512.0, 512.0);
        assert_eq!(tile_zoom, 2);
        // 512 px centered on the world midpoint spans tile indices 1..=3
        assert_eq!(tiles.len(), 9);
        assert!(tiles.iter().all(|t| (1..=3).contains(&t.x) && (1..=3).contains(&t.y)));
    }

    #[test]
    fn test_visible_tiles_clamp_at_the_world_edge() {
        let top_left = GeoPoint {
            lon: -179.9,
            lat: 84.9,
        };
        let (_, tiles) = visible_tiles(top_left, 3.0, 1024.0, 1024.0);
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.x < 8 && t.y < 8));
    }

    #[test]
    fn test_camera_interpolation_endpoints() {
        let from = (GeoPoint { lon: 0.0, lat: 0.0 }, 4.0);
        let to = (medellin(), 14.0);

        let (start, start_zoom) = interpolate_camera(from, to, 0.0);
        assert_eq!((start.lon, start.lat, start_zoom), (0.0, 0.0, 4.0));

        let (end, end_zoom) = interpolate_camera(from, to, 1.0);
        assert_eq!((end.lon, end.lat), (medellin().lon, medellin().lat));
        assert_eq!(end_zoom, 14.0);

        // overshoot clamps instead of extrapolating
        let (past, past_zoom) = interpolate_camera(from, to, 1.7);
        assert_eq!((past.lon, past.lat, past_zoom), (end.lon, end.lat, 14.0));
    }

    #[test]
    fn test_fly_to_completes_on_the_target() {
        let mut fly = FlyTo {
            from: (GeoPoint { lon: 0.0, lat: 0.0 }, 4.0),
            to: (medellin(), FLY_TO_ZOOM),
            progress: 0.0,
            speed: FLY_TO_SPEED,
        };

        let mut camera = (GeoPoint { lon: 0.0, lat: 0.0 }, 4.0);
        let mut done = false;
        for _ in 0..200 {
            let (c, d) = fly.advance(0.016);
            camera = c;
            if d {
                done = true;
                break;
            }
        }
        assert!(done, "fly-to never finished");
        assert_eq!(camera.1, FLY_TO_ZOOM);
        assert!((camera.0.lon - medellin().lon).abs() < 1e-9);
    }

    #[test]
    fn test_marker_is_upserted_in_place() {
        let mut panel = MapPanel::new(medellin(), 12.0);
        assert!(panel.marker.is_none());

        let first = GeoPoint {
            lon: -75.6,
            lat: 6.2,
        };
        let second = GeoPoint {
            lon: -75.5,
            lat: 6.3,
        };
        panel.upsert_marker(first);
        panel.upsert_marker(second);
        assert_eq!(panel.marker, Some(second));
    }

    #[test]
    fn test_fly_to_clamps_the_target_zoom() {
        let mut panel = MapPanel::new(medellin(), 12.0);
        panel.fly_to(medellin(), 40.0, FLY_TO_SPEED);
        assert_eq!(panel.fly_to.as_ref().unwrap().to.1, MAX_ZOOM);
    }
}
