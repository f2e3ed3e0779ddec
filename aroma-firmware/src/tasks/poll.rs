//! Sensor polling task
//!
//! Every polling cycle, each scheduled sensor either takes a reading
//! (gas resistance, temperature, humidity) or sleeps, following its
//! duty-cycle profile. Readings go to the log.

use defmt::*;
use embassy_time::{Duration, Ticker};

use aroma_core::duty::CyclePhase;
use aroma_core::traits::SensorDriver;

use crate::board::{Sensor, GAS_HEATER_STEP, POLL_INTERVAL_SECS};
use crate::config::Schedules;

/// Polling task - samples scheduled sensors once per interval
#[embassy_executor::task]
pub async fn poll_task(mut sensor: Sensor, mut schedules: Schedules) {
    if schedules.is_empty() {
        warn!("No sensors to poll");
        return;
    }
    info!(
        "Polling {} sensor(s) every {}s",
        schedules.len(),
        POLL_INTERVAL_SECS
    );

    let mut ticker = Ticker::every(Duration::from_secs(POLL_INTERVAL_SECS));

    loop {
        ticker.next().await;

        for entry in schedules.iter_mut() {
            match entry.schedule.advance() {
                CyclePhase::Scanning => sample(&mut sensor, entry.sensor_index),
                CyclePhase::Sleeping => trace!("Sensor {} sleeping", entry.sensor_index),
            }
        }
    }
}

/// Read and log one sensor
///
/// A failed reading is logged and the others are still attempted.
fn sample<D: SensorDriver>(sensor: &mut D, sensor_index: usize) {
    match sensor.read_gas_ohms(sensor_index, GAS_HEATER_STEP) {
        Ok(ohms) => info!("Sensor {}: gas {} ohm", sensor_index, ohms),
        Err(e) => warn!("Sensor {}: gas read failed: {}", sensor_index, e),
    }

    match sensor.read_temperature_x100(sensor_index) {
        Ok(t) => info!("Sensor {}: temperature {}°C", sensor_index, Hundredths(t)),
        Err(e) => warn!("Sensor {}: temperature read failed: {}", sensor_index, e),
    }

    match sensor.read_humidity_x1000(sensor_index) {
        Ok(h) => info!(
            "Sensor {}: humidity {} %RH",
            sensor_index,
            Hundredths((h / 10) as i32)
        ),
        Err(e) => warn!("Sensor {}: humidity read failed: {}", sensor_index, e),
    }
}

/// Fixed-point value in hundredths, printed with two decimals
struct Hundredths(i32);

impl Format for Hundredths {
    fn format(&self, f: Formatter) {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let frac = abs % 100;
        defmt::write!(f, "{}{}.{}{}", sign, abs / 100, frac / 10, frac % 10)
    }
}
