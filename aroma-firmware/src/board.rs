//! Board wiring
//!
//! Raspberry Pi Pico with one BME688 breakout on I2C0:
//!
//! | Signal | GPIO |
//! |--------|------|
//! | SDA    | 4    |
//! | SCL    | 5    |
//!
//! The breakout pulls SDO high, so the sensor answers at 0x77.

use aroma_drivers::sensor::bme688::ADDRESS_SECONDARY;
use aroma_drivers::sensor::Bme688;
use aroma_hal_rp2040::i2c::BlockingI2c;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::Delay;

/// BME688 I2C address
pub const SENSOR_ADDRESS: u8 = ADDRESS_SECONDARY;

/// I2C clock (fast mode)
pub const I2C_FREQUENCY: u32 = 400_000;

/// Seconds between polling cycles
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Heater step used for gas readings
pub const GAS_HEATER_STEP: u8 = 0;

/// The sensor as wired on this board
pub type Sensor = Bme688<BlockingI2c<I2c<'static, I2C0, Blocking>>, Delay>;
