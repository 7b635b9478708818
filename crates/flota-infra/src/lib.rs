//! Infrastructure layer - blocking HTTP adapters for the external services
//!
//! Each adapter wraps exactly one external call: identity exchange, style
//! resolution, vehicle lookup, reverse geocoding, tile retrieval. All of
//! them share one blocking client with explicit timeouts; none of them
//! retries.

pub mod geocode;
pub mod http;
pub mod identity;
pub mod lookup;
pub mod style;
pub mod tiles;
