//! Raster tile retrieval for the map renderer

use image::RgbaImage;
use reqwest::blocking::Client;

/// Slippy-map tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

/// Interpolate a tile URL template with slippy-map coordinates.
///
/// Understands `{z}`/`{zoom}`, `{x}`, `{y}`, plus the optional `{s}`
/// subdomain and `{r}` retina placeholders some providers use.
pub fn tile_url(template: &str, tile: TileId) -> String {
    template
        .replace("{z}", &tile.zoom.to_string())
        .replace("{zoom}", &tile.zoom.to_string())
        .replace("{x}", &tile.x.to_string())
        .replace("{y}", &tile.y.to_string())
        .replace("{s}", "a")
        .replace("{r}", "")
}

/// Fetches and decodes raster tiles.
pub struct TileClient {
    http: Client,
}

impl TileClient {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    pub fn fetch(&self, template: &str, tile: TileId) -> Result<RgbaImage, String> {
        let url = tile_url(template, tile);

        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|err| format!("request error: {err}"))?;
        if !response.status().is_success() {
            return Err(format!("tile server responded with {}", response.status()));
        }
        let bytes = response
            .bytes()
            .map_err(|err| format!("failed to read tile response: {err}"))?;

        let decoded = image::load_from_memory(&bytes)
            .map_err(|err| format!("failed to decode tile: {err}"))?;
        Ok(decoded.into_rgba8())
    }
}
