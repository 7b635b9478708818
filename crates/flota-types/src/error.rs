//! Error types for the fleet-vehicle locator

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

/// Failures of a vehicle position lookup.
///
/// `InvalidId` is rejected locally and no request is sent for it. The
/// remaining variants abort the invocation with a user-visible message;
/// none of them is retried.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid vehicle id {0:?} (expected veh_1 through veh_20)")]
    InvalidId(String),

    #[error("lookup failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("could not reach the fleet service: {0}")]
    Transport(String),

    #[error("malformed position record: {0}")]
    Schema(String),
}

/// Failures of the startup credential exchange or style resolution.
///
/// These are fatal for map initialization; the map is never rendered
/// without an established session.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("identity exchange rejected with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("could not reach the identity service: {0}")]
    Transport(String),

    #[error("unexpected identity response: {0}")]
    Schema(String),
}

/// Failures of a reverse-geocoding query.
///
/// Never shown to the user as a failure: the adapter boundary converts
/// them into a sentinel address label.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("place index rejected the query with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("could not reach the place index: {0}")]
    Transport(String),

    #[error("unexpected place index response: {0}")]
    Schema(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),
}

pub type Result<T> = std::result::Result<T, Error>;
