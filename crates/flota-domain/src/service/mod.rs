//! Domain services

mod card;

pub use card::{compass_label, format_angle, format_lat_lon, ResultCard};
