//! Shared builders for unit tests

use heapless::Vec;

use crate::config::{
    ConfigHeader, Configuration, DutyCycleProfile, HeaderField, HeaterProfile, Label,
    SensorAssignment, TemperatureTimeVector,
};
use crate::traits::{DriverError, SensorDriver};

pub fn label(s: &str) -> Label {
    Label::try_from(s).unwrap()
}

fn header_field(s: &str) -> HeaderField {
    HeaderField::try_from(s).unwrap()
}

pub fn heater(id: &str, time_base: i32, steps: &[(i32, i32)]) -> HeaterProfile {
    let mut vectors = Vec::new();
    for &(temperature, duration) in steps {
        vectors
            .push(TemperatureTimeVector::new(temperature, duration))
            .unwrap();
    }
    HeaterProfile {
        id: label(id),
        time_base,
        vectors,
    }
}

pub fn duty(id: &str, scanning_cycles: i32, sleeping_cycles: i32) -> DutyCycleProfile {
    DutyCycleProfile {
        id: label(id),
        scanning_cycles,
        sleeping_cycles,
    }
}

pub fn assignment(sensor_index: i32, heater_profile: &str, duty_cycle_profile: &str) -> SensorAssignment {
    SensorAssignment {
        sensor_index,
        heater_profile: label(heater_profile),
        duty_cycle_profile: label(duty_cycle_profile),
    }
}

/// Configuration with one heater profile, one duty profile and the given
/// sensor slots all pointing at them
pub fn simple_config(sensor_indices: &[i32]) -> Configuration {
    let mut config = Configuration::new();
    config
        .heater_profiles
        .push(heater("h1", 100, &[(200, 2), (300, 3)]))
        .unwrap();
    config.duty_cycle_profiles.push(duty("d1", 1, 2)).unwrap();
    for &index in sensor_indices {
        config
            .sensor_assignments
            .push(assignment(index, "h1", "d1"))
            .unwrap();
    }
    config
}

/// Typed form of the compiled-in default document
pub fn default_configuration() -> Configuration {
    let mut config = Configuration::new();
    config.header = ConfigHeader {
        date_created: header_field("2025-04-25T21:42:13.628Z"),
        app_version: header_field("2.0.0"),
        board_type: header_field("board_8"),
        board_mode: header_field("burn_in"),
        board_layout: header_field("grouped"),
    };
    config
        .heater_profiles
        .push(heater(
            "heater_354",
            140,
            &[
                (320, 5),
                (100, 2),
                (100, 10),
                (100, 30),
                (200, 5),
                (200, 5),
                (200, 5),
                (320, 5),
                (320, 5),
                (320, 5),
            ],
        ))
        .unwrap();
    config
        .duty_cycle_profiles
        .push(duty("duty_5_10", 5, 10))
        .unwrap();
    for index in 0..8 {
        config
            .sensor_assignments
            .push(assignment(index, "heater_354", "duty_5_10"))
            .unwrap();
    }
    config
}

/// Recording sensor driver
#[derive(Debug, Default)]
pub struct FakeDriver {
    pub present: bool,
    pub sensors: usize,
    pub probes: u32,
    pub heater_calls: Vec<(usize, HeaterProfile), 16>,
    pub duty_calls: Vec<(usize, DutyCycleProfile), 16>,
    pub fail_heater_for: Option<usize>,
    pub fail_duty_for: Option<usize>,
}

impl FakeDriver {
    pub fn with_sensors(sensors: usize) -> Self {
        Self {
            present: true,
            sensors,
            ..Self::default()
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }
}

impl SensorDriver for FakeDriver {
    fn probe(&mut self) -> Result<(), DriverError> {
        self.probes += 1;
        if self.present {
            Ok(())
        } else {
            Err(DriverError::NotPresent)
        }
    }

    fn sensor_count(&self) -> usize {
        self.sensors
    }

    fn configure_heater_profile(
        &mut self,
        sensor_index: usize,
        profile: &HeaterProfile,
    ) -> Result<(), DriverError> {
        if self.fail_heater_for == Some(sensor_index) {
            return Err(DriverError::Bus);
        }
        self.heater_calls
            .push((sensor_index, profile.clone()))
            .unwrap();
        Ok(())
    }

    fn configure_duty_cycle(
        &mut self,
        sensor_index: usize,
        profile: &DutyCycleProfile,
    ) -> Result<(), DriverError> {
        if self.fail_duty_for == Some(sensor_index) {
            return Err(DriverError::Timeout);
        }
        self.duty_calls
            .push((sensor_index, profile.clone()))
            .unwrap();
        Ok(())
    }

    fn read_temperature_x100(&mut self, _sensor_index: usize) -> Result<i32, DriverError> {
        Ok(2345)
    }

    fn read_humidity_x1000(&mut self, _sensor_index: usize) -> Result<u32, DriverError> {
        Ok(41_000)
    }

    fn read_gas_ohms(&mut self, _sensor_index: usize, _heater_step: u8) -> Result<u32, DriverError> {
        Ok(120_000)
    }
}
