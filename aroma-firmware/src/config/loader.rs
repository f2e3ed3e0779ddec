//! Configuration loading
//!
//! Runs the boot pipeline once and turns its outcome into sampling
//! schedules for the polling task. Any stage failure is logged and the
//! sensor keeps the set-point it was given during bring-up.

use defmt::*;
use heapless::Vec;

use aroma_core::applier::ApplyReport;
use aroma_core::config::{Configuration, MAX_SENSOR_ASSIGNMENTS};
use aroma_core::duty::{schedules_for, DutySchedule, SensorSchedule};
use aroma_core::pipeline::{configure_sensors, BootError};
use aroma_core::store::{Bootstrap, ConfigStore, MAX_CONFIG_SIZE};
use aroma_core::traits::SensorDriver;
use aroma_hal_rp2040::FlashStorageTrait;

/// Sampling schedule for every sensor slot to poll
pub type Schedules = Vec<SensorSchedule, MAX_SENSOR_ASSIGNMENTS>;

/// Load, check and apply the stored configuration
pub async fn configure<S, D>(storage: S, driver: &mut D) -> Schedules
where
    S: FlashStorageTrait,
    D: SensorDriver,
{
    info!("Loading sensor configuration...");

    let mut store = ConfigStore::new(storage);
    let mut buffer = [0u8; MAX_CONFIG_SIZE];

    match configure_sensors(&mut store, driver, &mut buffer).await {
        Ok(outcome) => {
            if outcome.bootstrap == Bootstrap::Created {
                info!("No configuration in flash, default written");
            }
            log_config_summary(&outcome.config);
            log_apply_report(&outcome.report);
            schedules_for(&outcome.config, &outcome.report.applied)
        }
        Err(e) => {
            log_boot_error(&e);
            unconfigured_schedules(driver)
        }
    }
}

/// Poll every present sensor on every cycle
fn unconfigured_schedules<D: SensorDriver>(driver: &mut D) -> Schedules {
    let mut schedules = Vec::new();
    if driver.probe().is_err() {
        return schedules;
    }
    for sensor_index in 0..driver.sensor_count() {
        let schedule = SensorSchedule {
            sensor_index,
            schedule: DutySchedule::always_scanning(),
        };
        if schedules.push(schedule).is_err() {
            break;
        }
    }
    schedules
}

fn log_boot_error(e: &BootError) {
    match e {
        BootError::Storage(e) => error!("Configuration storage failed: {}", e),
        BootError::Parse(e) => error!("Configuration document rejected: {}", e),
        BootError::Validation(e) => error!("Configuration invalid: {}", e),
        BootError::Apply(e) => error!("Configuration not applied: {}", e),
    }
    warn!("Sensors keep their power-on settings");
}

fn log_apply_report(report: &ApplyReport) {
    for sensor_index in &report.applied {
        info!("Sensor {} configured", sensor_index);
    }
    for failed in &report.failed {
        warn!(
            "Sensor {} configuration failed: {}",
            failed.sensor_index, failed.error
        );
    }
    if !report.skipped.is_empty() {
        debug!("No sensor fitted at indices {}", report.skipped.as_slice());
    }
    info!(
        "{} sensor(s) configured, {} failed",
        report.applied_count(),
        report.failed.len()
    );
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &Configuration) {
    let header = &config.header;
    info!(
        "Board: type={} mode={} layout={}",
        header.board_type.as_str(),
        header.board_mode.as_str(),
        header.board_layout.as_str()
    );
    info!(
        "Created {} by app version {}",
        header.date_created.as_str(),
        header.app_version.as_str()
    );

    for profile in &config.heater_profiles {
        info!(
            "Heater profile '{}': timeBase={}ms, {} step(s)",
            profile.id.as_str(),
            profile.time_base,
            profile.vectors.len()
        );
        for (step, vector) in profile.vectors.iter().enumerate() {
            debug!(
                "  step {}: {}°C for {}",
                step, vector.temperature, vector.duration
            );
        }
    }

    for profile in &config.duty_cycle_profiles {
        info!(
            "Duty cycle profile '{}': scanning={} sleeping={}",
            profile.id.as_str(),
            profile.scanning_cycles,
            profile.sleeping_cycles
        );
    }

    for assignment in &config.sensor_assignments {
        debug!(
            "Sensor {}: heater='{}' duty='{}'",
            assignment.sensor_index,
            assignment.heater_profile.as_str(),
            assignment.duty_cycle_profile.as_str()
        );
    }
}
