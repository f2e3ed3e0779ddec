//! Configuration validation
//!
//! Semantic checks on a structurally valid [`Configuration`]. Checks run in
//! a fixed order and the first violation found is returned:
//!
//! 1. Duplicate heater profile ids
//! 2. Duplicate duty-cycle profile ids
//! 3. Duplicate sensor indices
//! 4. Sensor assignments naming a heater profile that does not exist
//! 5. Sensor assignments naming a duty-cycle profile that does not exist
//! 6. Heater profiles with no steps or a non-positive time base
//! 7. Heater steps with a negative duration
//! 8. Duty-cycle profiles with negative counts, or both counts zero
//! 9. Negative sensor indices

use core::fmt;

use crate::config::{Configuration, Label};

/// Which kind of profile a sensor assignment refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReferenceKind {
    Heater,
    DutyCycle,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Heater => write!(f, "heater profile"),
            ReferenceKind::DutyCycle => write!(f, "duty-cycle profile"),
        }
    }
}

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// Two heater profiles share an id
    DuplicateHeaterProfileId(Label),
    /// Two duty-cycle profiles share an id
    DuplicateDutyCycleProfileId(Label),
    /// Two assignments target the same sensor slot
    DuplicateSensorIndex(i32),
    /// An assignment names a profile that does not exist
    DanglingReference {
        sensor_index: i32,
        kind: ReferenceKind,
        missing_id: Label,
    },
    /// Heater profile has no steps
    EmptyHeaterProfile(Label),
    /// Heater profile time base is zero or negative
    InvalidTimeBase { id: Label, time_base: i32 },
    /// Heater step duration is negative
    NegativeStepDuration { id: Label, step: usize },
    /// Duty-cycle counts are negative, or both zero
    InvalidDutyCycle(Label),
    /// Sensor index is negative
    NegativeSensorIndex(i32),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateHeaterProfileId(id) => {
                write!(f, "duplicate heater profile id '{}'", id)
            }
            ValidationError::DuplicateDutyCycleProfileId(id) => {
                write!(f, "duplicate duty-cycle profile id '{}'", id)
            }
            ValidationError::DuplicateSensorIndex(index) => {
                write!(f, "sensor index {} assigned more than once", index)
            }
            ValidationError::DanglingReference {
                sensor_index,
                kind,
                missing_id,
            } => write!(
                f,
                "sensor {} references unknown {} '{}'",
                sensor_index, kind, missing_id
            ),
            ValidationError::EmptyHeaterProfile(id) => {
                write!(f, "heater profile '{}' has no steps", id)
            }
            ValidationError::InvalidTimeBase { id, time_base } => write!(
                f,
                "heater profile '{}' has non-positive timeBase {}",
                id, time_base
            ),
            ValidationError::NegativeStepDuration { id, step } => write!(
                f,
                "heater profile '{}' step {} has a negative duration",
                id, step
            ),
            ValidationError::InvalidDutyCycle(id) => write!(
                f,
                "duty-cycle profile '{}' has negative or all-zero cycle counts",
                id
            ),
            ValidationError::NegativeSensorIndex(index) => {
                write!(f, "negative sensor index {}", index)
            }
        }
    }
}

/// Validate a configuration, handing it back unchanged on success
pub fn validate(config: Configuration) -> Result<Configuration, ValidationError> {
    check(&config)?;
    Ok(config)
}

/// Validate a configuration in place
pub fn check(config: &Configuration) -> Result<(), ValidationError> {
    if let Some(id) = first_duplicate(config.heater_profiles.iter().map(|p| &p.id)) {
        return Err(ValidationError::DuplicateHeaterProfileId(id.clone()));
    }

    if let Some(id) = first_duplicate(config.duty_cycle_profiles.iter().map(|p| &p.id)) {
        return Err(ValidationError::DuplicateDutyCycleProfileId(id.clone()));
    }

    if let Some(index) = first_duplicate(config.sensor_assignments.iter().map(|a| &a.sensor_index)) {
        return Err(ValidationError::DuplicateSensorIndex(*index));
    }

    for assignment in &config.sensor_assignments {
        if config.find_heater_profile(&assignment.heater_profile).is_none() {
            return Err(ValidationError::DanglingReference {
                sensor_index: assignment.sensor_index,
                kind: ReferenceKind::Heater,
                missing_id: assignment.heater_profile.clone(),
            });
        }
    }

    for assignment in &config.sensor_assignments {
        if config
            .find_duty_cycle_profile(&assignment.duty_cycle_profile)
            .is_none()
        {
            return Err(ValidationError::DanglingReference {
                sensor_index: assignment.sensor_index,
                kind: ReferenceKind::DutyCycle,
                missing_id: assignment.duty_cycle_profile.clone(),
            });
        }
    }

    for profile in &config.heater_profiles {
        if profile.vectors.is_empty() {
            return Err(ValidationError::EmptyHeaterProfile(profile.id.clone()));
        }
        if profile.time_base <= 0 {
            return Err(ValidationError::InvalidTimeBase {
                id: profile.id.clone(),
                time_base: profile.time_base,
            });
        }
    }

    for profile in &config.heater_profiles {
        if let Some(step) = profile.vectors.iter().position(|v| v.duration < 0) {
            return Err(ValidationError::NegativeStepDuration {
                id: profile.id.clone(),
                step,
            });
        }
    }

    for profile in &config.duty_cycle_profiles {
        let negative = profile.scanning_cycles < 0 || profile.sleeping_cycles < 0;
        let idle = profile.scanning_cycles == 0 && profile.sleeping_cycles == 0;
        if negative || idle {
            return Err(ValidationError::InvalidDutyCycle(profile.id.clone()));
        }
    }

    if let Some(assignment) = config
        .sensor_assignments
        .iter()
        .find(|a| a.sensor_index < 0)
    {
        return Err(ValidationError::NegativeSensorIndex(assignment.sensor_index));
    }

    Ok(())
}

/// First item that repeats an earlier one, in document order
fn first_duplicate<'a, T, I>(items: I) -> Option<&'a T>
where
    T: PartialEq + 'a,
    I: Iterator<Item = &'a T> + Clone,
{
    items
        .clone()
        .enumerate()
        .find(|(i, item)| items.clone().take(*i).any(|earlier| earlier == *item))
        .map(|(_, item)| item)
}
