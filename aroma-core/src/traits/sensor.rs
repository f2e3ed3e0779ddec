//! Gas sensor driver trait

use core::fmt;

use crate::config::{DutyCycleProfile, HeaterProfile};

/// Errors reported by a sensor driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// No sensor answered, or it identified as the wrong part
    NotPresent,
    /// Bus transaction failed
    Bus,
    /// Sensor index outside `0..sensor_count()`
    InvalidSensorIndex,
    /// Profile cannot be programmed into the sensor
    UnsupportedProfile,
    /// Measurement did not complete in time
    Timeout,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::NotPresent => write!(f, "sensor not present"),
            DriverError::Bus => write!(f, "bus error"),
            DriverError::InvalidSensorIndex => write!(f, "invalid sensor index"),
            DriverError::UnsupportedProfile => write!(f, "profile not supported by sensor"),
            DriverError::Timeout => write!(f, "measurement timed out"),
        }
    }
}

/// Trait for gas sensor drivers
///
/// A driver owns one or more physical sensor slots, addressed by index
/// `0..sensor_count()`. The configuration applier only ever passes indices
/// in that range.
pub trait SensorDriver {
    /// Check the hardware is reachable and usable at all
    ///
    /// An error here aborts configuration of every slot.
    fn probe(&mut self) -> Result<(), DriverError>;

    /// Number of physically present sensor slots
    fn sensor_count(&self) -> usize;

    /// Program the heater step sequence for a slot
    fn configure_heater_profile(
        &mut self,
        sensor_index: usize,
        profile: &HeaterProfile,
    ) -> Result<(), DriverError>;

    /// Set the scan/sleep cadence for a slot
    fn configure_duty_cycle(
        &mut self,
        sensor_index: usize,
        profile: &DutyCycleProfile,
    ) -> Result<(), DriverError>;

    /// Read temperature in hundredths of a degree Celsius
    ///
    /// For example, 23.45°C is returned as 2345.
    fn read_temperature_x100(&mut self, sensor_index: usize) -> Result<i32, DriverError>;

    /// Read relative humidity in thousandths of a percent
    fn read_humidity_x1000(&mut self, sensor_index: usize) -> Result<u32, DriverError>;

    /// Run one gas measurement at the given heater step and return the
    /// gas resistance in ohms
    fn read_gas_ohms(&mut self, sensor_index: usize, heater_step: u8) -> Result<u32, DriverError>;
}
