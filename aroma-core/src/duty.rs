//! Duty-cycle sampling cadence
//!
//! A duty-cycle profile splits polling cycles into a run of scanning
//! cycles followed by a run of sleeping cycles, repeating forever. The
//! schedule only decides whether a cycle samples; heater timing within a
//! measurement stays in the sensor.

use heapless::Vec;

use crate::config::{Configuration, DutyCycleProfile, MAX_SENSOR_ASSIGNMENTS};

/// What a sensor does during one polling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CyclePhase {
    /// Take a measurement
    Scanning,
    /// Leave the sensor idle
    Sleeping,
}

/// Position within a scan/sleep cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutySchedule {
    scanning: u32,
    sleeping: u32,
    position: u32,
}

impl DutySchedule {
    /// Schedule for a duty-cycle profile, starting with the first scan
    ///
    /// Negative counts are treated as zero. A profile with both counts zero
    /// scans every cycle.
    pub fn new(profile: &DutyCycleProfile) -> Self {
        let scanning = u32::try_from(profile.scanning_cycles).unwrap_or(0);
        let sleeping = u32::try_from(profile.sleeping_cycles).unwrap_or(0);
        if scanning == 0 && sleeping == 0 {
            return Self::always_scanning();
        }
        Self {
            scanning,
            sleeping,
            position: 0,
        }
    }

    /// Schedule that samples on every cycle
    pub const fn always_scanning() -> Self {
        Self {
            scanning: 1,
            sleeping: 0,
            position: 0,
        }
    }

    /// Cycles in one full scan/sleep period
    pub fn period(&self) -> u32 {
        self.scanning + self.sleeping
    }

    /// Phase of the current cycle
    pub fn phase(&self) -> CyclePhase {
        if self.position < self.scanning {
            CyclePhase::Scanning
        } else {
            CyclePhase::Sleeping
        }
    }

    /// Phase of the current cycle, then move on to the next one
    pub fn advance(&mut self) -> CyclePhase {
        let phase = self.phase();
        self.position = (self.position + 1) % self.period();
        phase
    }
}

/// Sampling schedule for one configured sensor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSchedule {
    pub sensor_index: usize,
    pub schedule: DutySchedule,
}

/// Build schedules for the slots that were configured
///
/// Slots with no assignment, or whose duty-cycle profile is missing, get
/// no schedule.
pub fn schedules_for(
    config: &Configuration,
    configured: &[usize],
) -> Vec<SensorSchedule, MAX_SENSOR_ASSIGNMENTS> {
    let mut schedules = Vec::new();
    for &sensor_index in configured {
        let profile = i32::try_from(sensor_index)
            .ok()
            .and_then(|index| config.find_assignment(index))
            .and_then(|a| config.find_duty_cycle_profile(&a.duty_cycle_profile));
        if let Some(profile) = profile {
            if schedules
                .push(SensorSchedule {
                    sensor_index,
                    schedule: DutySchedule::new(profile),
                })
                .is_err()
            {
                break;
            }
        }
    }
    schedules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{default_configuration, duty, simple_config};

    fn phases<const N: usize>(schedule: &mut DutySchedule) -> [CyclePhase; N] {
        let mut out = [CyclePhase::Sleeping; N];
        for slot in out.iter_mut() {
            *slot = schedule.advance();
        }
        out
    }

    #[test]
    fn test_scan_then_sleep_repeats() {
        use CyclePhase::{Scanning as S, Sleeping as Z};

        let mut schedule = DutySchedule::new(&duty("d", 2, 3));
        assert_eq!(schedule.period(), 5);
        assert_eq!(phases::<10>(&mut schedule), [S, S, Z, Z, Z, S, S, Z, Z, Z]);
    }

    #[test]
    fn test_default_profile_cadence() {
        let mut schedule = DutySchedule::new(&duty("duty_5_10", 5, 10));
        let cycle = phases::<15>(&mut schedule);
        assert!(cycle[..5].iter().all(|p| *p == CyclePhase::Scanning));
        assert!(cycle[5..].iter().all(|p| *p == CyclePhase::Sleeping));
        assert_eq!(schedule.phase(), CyclePhase::Scanning);
    }

    #[test]
    fn test_never_sleeping() {
        let mut schedule = DutySchedule::new(&duty("d", 3, 0));
        assert!(phases::<7>(&mut schedule)
            .iter()
            .all(|p| *p == CyclePhase::Scanning));
    }

    #[test]
    fn test_degenerate_profiles_scan_every_cycle() {
        assert_eq!(DutySchedule::new(&duty("d", 0, 0)), DutySchedule::always_scanning());
        assert_eq!(DutySchedule::new(&duty("d", -4, 0)), DutySchedule::always_scanning());

        let mut schedule = DutySchedule::new(&duty("d", 0, 2));
        assert_eq!(phases::<2>(&mut schedule), [CyclePhase::Sleeping; 2]);
    }

    #[test]
    fn test_schedules_for_configured_slots() {
        let schedules = schedules_for(&default_configuration(), &[0]);
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].sensor_index, 0);
        assert_eq!(schedules[0].schedule.period(), 15);
    }

    #[test]
    fn test_unassigned_slots_get_no_schedule() {
        let schedules = schedules_for(&simple_config(&[1]), &[0, 1]);
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].sensor_index, 1);
    }
}
