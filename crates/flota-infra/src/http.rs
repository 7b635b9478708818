//! Shared blocking HTTP client construction

use std::time::Duration;

use reqwest::blocking::Client;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the blocking client shared by all adapters.
///
/// Timeouts are explicit; a hung external service fails the invocation
/// instead of stalling it indefinitely.
pub fn client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}
