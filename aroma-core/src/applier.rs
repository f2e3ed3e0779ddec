//! Configuration applier
//!
//! Resolves every sensor assignment to its heater and duty-cycle profiles
//! and hands them to the sensor driver. A driver failure on one slot is
//! recorded and the batch moves on; only an unusable driver aborts.

use core::fmt;

use heapless::Vec;

use crate::config::{Configuration, MAX_SENSOR_ASSIGNMENTS};
use crate::traits::{DriverError, SensorDriver};

/// A sensor slot the driver refused to configure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FailedSensor {
    pub sensor_index: usize,
    pub error: DriverError,
}

/// Result of applying a configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ApplyReport {
    /// Slots configured successfully, in document order
    pub applied: Vec<usize, MAX_SENSOR_ASSIGNMENTS>,
    /// Slots where the driver reported an error
    pub failed: Vec<FailedSensor, MAX_SENSOR_ASSIGNMENTS>,
    /// Assigned indices with no physical sensor behind them
    pub skipped: Vec<i32, MAX_SENSOR_ASSIGNMENTS>,
}

impl ApplyReport {
    /// Number of sensor slots configured successfully
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Check if every present sensor was configured
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Errors that abort the whole apply batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ApplyError {
    /// The driver failed its probe
    DriverUnavailable(DriverError),
    /// An assignment names a profile that is not in the configuration
    ///
    /// Cannot happen for a validated configuration.
    UnresolvedReference { sensor_index: i32 },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyError::DriverUnavailable(e) => write!(f, "sensor driver unavailable: {}", e),
            ApplyError::UnresolvedReference { sensor_index } => write!(
                f,
                "sensor {} references a profile that does not exist",
                sensor_index
            ),
        }
    }
}

/// Apply a validated configuration to the sensor driver
pub fn apply<D: SensorDriver>(
    config: &Configuration,
    driver: &mut D,
) -> Result<ApplyReport, ApplyError> {
    driver.probe().map_err(ApplyError::DriverUnavailable)?;

    let sensor_count = driver.sensor_count();
    let mut report = ApplyReport::default();

    // Report vectors hold as many entries as there can be assignments, so
    // the pushes below cannot overflow.
    for assignment in &config.sensor_assignments {
        let index = match usize::try_from(assignment.sensor_index) {
            Ok(index) if index < sensor_count => index,
            _ => {
                let _ = report.skipped.push(assignment.sensor_index);
                continue;
            }
        };

        let unresolved = ApplyError::UnresolvedReference {
            sensor_index: assignment.sensor_index,
        };
        let heater = config
            .find_heater_profile(&assignment.heater_profile)
            .ok_or(unresolved)?;
        let duty = config
            .find_duty_cycle_profile(&assignment.duty_cycle_profile)
            .ok_or(unresolved)?;

        let result = driver
            .configure_heater_profile(index, heater)
            .and_then(|()| driver.configure_duty_cycle(index, duty));

        match result {
            Ok(()) => {
                let _ = report.applied.push(index);
            }
            Err(error) => {
                let _ = report.failed.push(FailedSensor {
                    sensor_index: index,
                    error,
                });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        assignment, default_configuration, duty, heater, simple_config, FakeDriver,
    };

    #[test]
    fn test_single_assignment_resolves_exact_profiles() {
        let mut config = Configuration::new();
        config
            .heater_profiles
            .push(heater("h1", 10, &[(300, 5)]))
            .unwrap();
        config.duty_cycle_profiles.push(duty("d1", 2, 3)).unwrap();
        config
            .sensor_assignments
            .push(assignment(0, "h1", "d1"))
            .unwrap();

        let mut driver = FakeDriver::with_sensors(1);
        let report = apply(&config, &mut driver).unwrap();

        assert_eq!(report.applied_count(), 1);
        assert!(report.is_complete());
        assert_eq!(driver.heater_calls.len(), 1);
        assert_eq!(driver.heater_calls[0], (0, heater("h1", 10, &[(300, 5)])));
        assert_eq!(driver.duty_calls[0], (0, duty("d1", 2, 3)));
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let mut driver = FakeDriver::with_sensors(1);
        let report = apply(&default_configuration(), &mut driver).unwrap();

        assert_eq!(report.applied.as_slice(), &[0]);
        assert_eq!(report.skipped.as_slice(), &[1, 2, 3, 4, 5, 6, 7]);
        assert!(report.failed.is_empty());
        assert_eq!(driver.heater_calls.len(), 1);
    }

    #[test]
    fn test_negative_index_is_skipped() {
        let config = simple_config(&[-1, 0]);
        let mut driver = FakeDriver::with_sensors(4);
        let report = apply(&config, &mut driver).unwrap();

        assert_eq!(report.skipped.as_slice(), &[-1]);
        assert_eq!(report.applied.as_slice(), &[0]);
    }

    #[test]
    fn test_driver_failure_is_recorded_and_batch_continues() {
        let config = simple_config(&[0, 1, 2]);
        let mut driver = FakeDriver::with_sensors(3);
        driver.fail_heater_for = Some(1);
        driver.fail_duty_for = Some(2);

        let report = apply(&config, &mut driver).unwrap();

        assert_eq!(report.applied.as_slice(), &[0]);
        assert_eq!(
            report.failed.as_slice(),
            &[
                FailedSensor {
                    sensor_index: 1,
                    error: DriverError::Bus,
                },
                FailedSensor {
                    sensor_index: 2,
                    error: DriverError::Timeout,
                },
            ]
        );
        assert!(!report.is_complete());
        // Slot 1 never reaches the duty-cycle call
        assert_eq!(driver.heater_calls.len(), 2);
        assert_eq!(driver.duty_calls.len(), 1);
    }

    #[test]
    fn test_absent_driver_aborts_batch() {
        let mut driver = FakeDriver::absent();
        assert_eq!(
            apply(&simple_config(&[0]), &mut driver),
            Err(ApplyError::DriverUnavailable(DriverError::NotPresent))
        );
        assert!(driver.heater_calls.is_empty());
    }

    #[test]
    fn test_unresolved_reference() {
        let mut config = simple_config(&[]);
        config
            .sensor_assignments
            .push(assignment(0, "h1", "ghost"))
            .unwrap();
        let mut driver = FakeDriver::with_sensors(1);
        assert_eq!(
            apply(&config, &mut driver),
            Err(ApplyError::UnresolvedReference { sensor_index: 0 })
        );
    }
}
