//! Configuration type definitions
//!
//! These types represent the sensor board configuration. It is stored in
//! flash as a JSON document and parsed into these fixed-capacity types so
//! memory use is known at compile time.

use heapless::{String, Vec};

/// Maximum profile id length
pub const MAX_LABEL_LEN: usize = 32;

/// Maximum length of each header field
pub const MAX_HEADER_FIELD_LEN: usize = 32;

/// Maximum steps per heater profile
///
/// The BME688 has 10 heater set-points; the extra headroom lets a document
/// written for a larger part still load (the driver rejects what it cannot
/// program).
pub const MAX_HEATER_STEPS: usize = 16;

/// Maximum heater profiles per config
pub const MAX_HEATER_PROFILES: usize = 8;

/// Maximum duty-cycle profiles per config
pub const MAX_DUTY_CYCLE_PROFILES: usize = 8;

/// Maximum sensor assignments per config
pub const MAX_SENSOR_ASSIGNMENTS: usize = 16;

/// Profile identifier
pub type Label = String<MAX_LABEL_LEN>;

/// Free-form header field
pub type HeaderField = String<MAX_HEADER_FIELD_LEN>;

/// Document header
///
/// Informational only. None of these fields are interpreted by the
/// validator or the applier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigHeader {
    /// Creation timestamp (ISO 8601 text)
    pub date_created: HeaderField,
    /// Version of the tool that wrote the document
    pub app_version: HeaderField,
    /// Board identifier, e.g. "board_8"
    pub board_type: HeaderField,
    /// Board mode, e.g. "burn_in"
    pub board_mode: HeaderField,
    /// Board layout, e.g. "grouped"
    pub board_layout: HeaderField,
}

/// Single heater step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureTimeVector {
    /// Heater target temperature (°C)
    pub temperature: i32,
    /// Step duration in multiples of the profile time base
    pub duration: i32,
}

impl TemperatureTimeVector {
    /// Create a heater step
    pub const fn new(temperature: i32, duration: i32) -> Self {
        Self {
            temperature,
            duration,
        }
    }
}

/// Heater profile: an ordered heater step sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaterProfile {
    /// Unique profile id
    pub id: Label,
    /// Time base in milliseconds
    pub time_base: i32,
    /// Heater steps, in execution order
    pub vectors: Vec<TemperatureTimeVector, MAX_HEATER_STEPS>,
}

/// Duty-cycle profile: scan/sleep cadence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycleProfile {
    /// Unique profile id
    pub id: Label,
    /// Consecutive cycles spent measuring
    pub scanning_cycles: i32,
    /// Consecutive cycles spent asleep
    pub sleeping_cycles: i32,
}

/// Binding of a physical sensor slot to its profiles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorAssignment {
    /// Physical sensor slot
    pub sensor_index: i32,
    /// Heater profile id
    pub heater_profile: Label,
    /// Duty-cycle profile id
    pub duty_cycle_profile: Label,
}

/// Complete sensor configuration
///
/// Built once per boot by the parser, checked by the validator and then
/// only read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    /// Document header
    pub header: ConfigHeader,
    /// Heater profiles, in document order
    pub heater_profiles: Vec<HeaterProfile, MAX_HEATER_PROFILES>,
    /// Duty-cycle profiles, in document order
    pub duty_cycle_profiles: Vec<DutyCycleProfile, MAX_DUTY_CYCLE_PROFILES>,
    /// Sensor assignments, in document order
    pub sensor_assignments: Vec<SensorAssignment, MAX_SENSOR_ASSIGNMENTS>,
}

impl Configuration {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a heater profile by id
    pub fn find_heater_profile(&self, id: &str) -> Option<&HeaterProfile> {
        self.heater_profiles.iter().find(|p| p.id.as_str() == id)
    }

    /// Find a duty-cycle profile by id
    pub fn find_duty_cycle_profile(&self, id: &str) -> Option<&DutyCycleProfile> {
        self.duty_cycle_profiles
            .iter()
            .find(|p| p.id.as_str() == id)
    }

    /// Find the assignment for a sensor slot
    pub fn find_assignment(&self, sensor_index: i32) -> Option<&SensorAssignment> {
        self.sensor_assignments
            .iter()
            .find(|a| a.sensor_index == sensor_index)
    }
}
