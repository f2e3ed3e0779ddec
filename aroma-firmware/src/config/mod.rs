//! Sensor configuration at boot
//!
//! Loads the JSON document from flash (writing the compiled-in default on
//! first boot), applies it to the sensor and logs what happened.

pub mod loader;

pub use loader::{configure, Schedules};
