//! Environmental and gas sensors

pub mod bme688;

pub use bme688::{Bme688, Measurement};
