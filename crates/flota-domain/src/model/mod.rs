//! Domain models

mod located;

pub use located::LocatedVehicle;
