//! Configuration management for flota
//!
//! Config stored at: ~/.config/flota/config.json

use flota_types::{ConfigError, GeoPoint, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Region the geo services live in
    #[serde(default = "default_region")]
    pub region: String,

    /// Identity pool exchanged for temporary read credentials
    #[serde(default = "default_identity_pool_id")]
    pub identity_pool_id: String,

    /// Identity service endpoint override (derived from region otherwise)
    #[serde(default)]
    pub identity_url: Option<String>,

    /// Named map resource rendered in the GUI
    #[serde(default = "default_map_name")]
    pub map_name: String,

    /// Style service endpoint override
    #[serde(default)]
    pub style_url: Option<String>,

    /// Place index queried for reverse geocoding
    #[serde(default = "default_place_index_name")]
    pub place_index_name: String,

    /// Places service endpoint override
    #[serde(default)]
    pub places_url: Option<String>,

    /// Fleet backend base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// API key sent in the x-api-key header. This is a public-facing
    /// credential constrained by backend-side scoping, not a secret.
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Initial map center as [lon, lat]
    #[serde(default = "default_center")]
    pub default_center: [f64; 2],

    /// Initial map zoom
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    /// Default output format for the CLI (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_region() -> String {
    "us-east-2".to_string()
}

fn default_identity_pool_id() -> String {
    "us-east-2:c2b05251-ae4e-46e0-92b3-fc545b9b9424".to_string()
}

fn default_map_name() -> String {
    "SUMO-Fleet-Map".to_string()
}

fn default_place_index_name() -> String {
    "SUMO-Reverse-Geocoding-Index".to_string()
}

fn default_api_base_url() -> String {
    "https://33hsvfie2g.execute-api.us-east-2.amazonaws.com/prod".to_string()
}

fn default_api_key() -> String {
    "rcVrNOSfwOaBIuHQJ6XRe7R8hZDGLJzD2XZYH5IP".to_string()
}

fn default_center() -> [f64; 2] {
    // Medellín
    [-75.589, 6.208]
}

fn default_zoom() -> f64 {
    12.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: default_region(),
            identity_pool_id: default_identity_pool_id(),
            identity_url: None,
            map_name: default_map_name(),
            style_url: None,
            place_index_name: default_place_index_name(),
            places_url: None,
            api_base_url: default_api_base_url(),
            api_key: default_api_key(),
            default_center: default_center(),
            default_zoom: default_zoom(),
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("flota");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default location, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|err| ConfigError::ParseError(err.to_string()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|err| ConfigError::SaveError(err.to_string()))?;
        Ok(())
    }

    pub fn identity_endpoint(&self) -> String {
        self.identity_url
            .clone()
            .unwrap_or_else(|| format!("https://cognito-identity.{}.amazonaws.com", self.region))
    }

    pub fn style_endpoint(&self) -> String {
        self.style_url
            .clone()
            .unwrap_or_else(|| format!("https://maps.geo.{}.amazonaws.com/maps/v0/maps", self.region))
    }

    pub fn places_endpoint(&self) -> String {
        self.places_url
            .clone()
            .unwrap_or_else(|| format!("https://places.geo.{}.amazonaws.com/places/v0", self.region))
    }

    pub fn default_center_point(&self) -> GeoPoint {
        GeoPoint {
            lon: self.default_center[0],
            lat: self.default_center[1],
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Flota Configuration")?;
        writeln!(f, "===================")?;
        writeln!(f)?;
        writeln!(f, "Region:           {}", self.region)?;
        writeln!(f, "Identity pool:    {}", self.identity_pool_id)?;
        writeln!(f, "Map name:         {}", self.map_name)?;
        writeln!(f, "Place index:      {}", self.place_index_name)?;
        writeln!(f, "Backend URL:      {}", self.api_base_url)?;
        writeln!(
            f,
            "Default center:   {:.3}, {:.3} (zoom {})",
            self.default_center[1], self.default_center[0], self.default_zoom
        )?;
        writeln!(f, "Output format:    {}", self.output_format)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:      {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.region = "eu-west-1".to_string();
        config.default_zoom = 9.0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.region, "eu-west-1");
        assert_eq!(loaded.default_zoom, 9.0);
        assert_eq!(loaded.map_name, config.map_name);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.region, "us-east-2");
        assert_eq!(config.default_center, [-75.589, 6.208]);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"region":"sa-east-1"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.region, "sa-east-1");
        assert_eq!(config.map_name, "SUMO-Fleet-Map");
        assert_eq!(
            config.identity_endpoint(),
            "https://cognito-identity.sa-east-1.amazonaws.com"
        );
    }

    #[test]
    fn endpoint_overrides_win_over_derivation() {
        let mut config = Config::default();
        config.identity_url = Some("http://localhost:9229".to_string());
        assert_eq!(config.identity_endpoint(), "http://localhost:9229");
    }
}
