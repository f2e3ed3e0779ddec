//! Hardware abstraction traits
//!
//! These traits define the interface between the configuration pipeline
//! and the sensor hardware.

pub mod sensor;

pub use sensor::{DriverError, SensorDriver};
