//! Bosch BME688 gas sensor (I2C)
//!
//! Temperature, humidity and gas resistance sensor with a programmable
//! hot plate. The driver runs the sensor in forced mode: every reading
//! triggers one measurement and waits for it to complete.
//!
//! # Heater profiles
//!
//! The sensor stores up to 10 heater set-points (`res_heat_0..9` and
//! `gas_wait_0..9`). A heater profile is written into those slots, one
//! step per slot, and a gas reading selects the step to heat with.
//!
//! # Duty cycle
//!
//! The sensor has no notion of scan/sleep cycles. The configured profile
//! is kept so the polling loop can decide which cycles sample.

mod calibration;

use aroma_core::config::{DutyCycleProfile, HeaterProfile};
use aroma_core::traits::{DriverError, SensorDriver};
use aroma_hal::I2cBus;
use embedded_hal::delay::DelayNs;
use heapless::Vec;

pub use calibration::{gas_resistance_ohms, gas_wait, Calibration, MAX_GAS_WAIT_MS};
use calibration::{COEFF1_LEN, COEFF2_LEN, COEFF3_LEN};

/// BME688 register addresses
pub mod reg {
    /// First register of the data field (measurement status)
    pub const FIELD_0: u8 = 0x1D;
    /// Heater resistance set-points 0..9
    pub const RES_HEAT_0: u8 = 0x5A;
    /// Heater durations 0..9
    pub const GAS_WAIT_0: u8 = 0x64;
    /// Heater control (heat_off)
    pub const CTRL_GAS_0: u8 = 0x70;
    /// Gas control (run_gas, nb_conv)
    pub const CTRL_GAS_1: u8 = 0x71;
    /// Humidity oversampling
    pub const CTRL_HUM: u8 = 0x72;
    /// Temperature/pressure oversampling and mode
    pub const CTRL_MEAS: u8 = 0x74;
    /// Chip identifier
    pub const CHIP_ID: u8 = 0xD0;
    /// Soft reset
    pub const RESET: u8 = 0xE0;
    /// Variant identifier
    pub const VARIANT_ID: u8 = 0xF0;
    /// Calibration block 1
    pub const COEFF_1: u8 = 0x8A;
    /// Calibration block 2
    pub const COEFF_2: u8 = 0xE1;
    /// Calibration block 3
    pub const COEFF_3: u8 = 0x00;
}

/// Address with SDO pulled low
pub const ADDRESS_PRIMARY: u8 = 0x76;
/// Address with SDO pulled high
pub const ADDRESS_SECONDARY: u8 = 0x77;

/// Expected `CHIP_ID` value
pub const CHIP_ID: u8 = 0x61;
/// `VARIANT_ID` value of the BME688 (BME680 reads 0x00)
pub const VARIANT_BME688: u8 = 0x01;

/// Heater set-point slots in the sensor
pub const HEATER_SET_POINTS: usize = 10;

const SOFT_RESET_CMD: u8 = 0xB6;
const RESET_DELAY_MS: u32 = 10;

const MODE_FORCED: u8 = 0b01;
/// Oversampling x8 / x4 / x2
const OSRS_T: u8 = 0b100;
const OSRS_P: u8 = 0b011;
const OSRS_H: u8 = 0b010;

const HEAT_OFF: u8 = 0x08;
const RUN_GAS: u8 = 0x20;

const NEW_DATA: u8 = 0x80;
const GAS_VALID: u8 = 0x20;
const HEAT_STAB: u8 = 0x10;

/// Bytes read from `FIELD_0` (0x1D..=0x2D)
const FIELD_LEN: usize = 17;

/// Temperature, pressure and humidity conversion time at the
/// oversampling above, rounded up
const TPH_DURATION_MS: u32 = 34;
const POLL_INTERVAL_MS: u32 = 5;
const POLL_ATTEMPTS: u32 = 20;

/// Ambient temperature assumed when computing heater set-points
const AMBIENT_TEMP_C: i32 = 25;

/// Heater set-point programmed by `begin` until a profile is applied
const DEFAULT_HEATER: (i32, u32) = (320, 150);

/// One completed measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Temperature in 0.01°C
    pub temperature_x100: i32,
    /// Relative humidity in 0.001 %RH
    pub humidity_x1000: u32,
    /// Gas resistance in ohms, if a gas conversion ran and is valid
    pub gas_ohms: Option<u32>,
    /// Hot plate reached its target before the gas conversion
    pub heat_stable: bool,
}

/// BME688 driver
///
/// A single physical sensor, exposed as sensor slot 0.
pub struct Bme688<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    calibration: Option<Calibration>,
    heater_steps: usize,
    heater_wait_ms: [u32; HEATER_SET_POINTS],
    duty_cycle: Option<DutyCycleProfile>,
}

impl<I2C: I2cBus, D: DelayNs> Bme688<I2C, D> {
    /// Create a driver; call [`begin`](Self::begin) before use
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            calibration: None,
            heater_steps: 0,
            heater_wait_ms: [0; HEATER_SET_POINTS],
            duty_cycle: None,
        }
    }

    /// Reset the sensor, check its identity and read its calibration
    ///
    /// Also programs a single default heater set-point so gas readings
    /// work before any profile is applied.
    pub fn begin(&mut self) -> Result<(), DriverError> {
        self.calibration = None;
        self.write(reg::RESET, SOFT_RESET_CMD)?;
        self.delay.delay_ms(RESET_DELAY_MS);

        if self.read_register(reg::CHIP_ID)? != CHIP_ID {
            return Err(DriverError::NotPresent);
        }
        if self.read_register(reg::VARIANT_ID)? != VARIANT_BME688 {
            return Err(DriverError::NotPresent);
        }

        let mut coeff1 = [0u8; COEFF1_LEN];
        let mut coeff2 = [0u8; COEFF2_LEN];
        let mut coeff3 = [0u8; COEFF3_LEN];
        self.read(reg::COEFF_1, &mut coeff1)?;
        self.read(reg::COEFF_2, &mut coeff2)?;
        self.read(reg::COEFF_3, &mut coeff3)?;
        self.calibration = Some(Calibration::from_registers(&coeff1, &coeff2, &coeff3));

        self.program_heater(&[DEFAULT_HEATER])
    }

    /// Calibration read by `begin`, if it succeeded
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Number of heater steps currently programmed
    pub fn heater_steps(&self) -> usize {
        self.heater_steps
    }

    /// Duty-cycle profile configured for the sensor
    pub fn duty_cycle(&self) -> Option<&DutyCycleProfile> {
        self.duty_cycle.as_ref()
    }

    /// Run one forced measurement
    ///
    /// With `heater_step` set, the hot plate heats to that set-point and a
    /// gas conversion runs after temperature and humidity.
    pub fn measure(&mut self, heater_step: Option<u8>) -> Result<Measurement, DriverError> {
        let calibration = self.calibration.ok_or(DriverError::NotPresent)?;
        let mut wait_ms = TPH_DURATION_MS;

        match heater_step {
            Some(step) => {
                let step_index = usize::from(step);
                if step_index >= self.heater_steps {
                    return Err(DriverError::UnsupportedProfile);
                }
                self.write(reg::CTRL_GAS_0, 0)?;
                self.write(reg::CTRL_GAS_1, RUN_GAS | step)?;
                wait_ms += self.heater_wait_ms[step_index];
            }
            None => {
                self.write(reg::CTRL_GAS_0, HEAT_OFF)?;
                self.write(reg::CTRL_GAS_1, 0)?;
            }
        }
        self.write(reg::CTRL_HUM, OSRS_H)?;
        self.write(reg::CTRL_MEAS, (OSRS_T << 5) | (OSRS_P << 2) | MODE_FORCED)?;
        self.delay.delay_ms(wait_ms);

        let field = self.wait_for_data()?;

        let adc_temp =
            (u32::from(field[5]) << 12) | (u32::from(field[6]) << 4) | (u32::from(field[7]) >> 4);
        let adc_hum = u16::from_be_bytes([field[8], field[9]]);
        let adc_gas = (u16::from(field[15]) << 2) | (u16::from(field[16]) >> 6);
        let gas_status = field[16];

        let t_fine = calibration.t_fine(adc_temp);
        let gas_ohms = (heater_step.is_some() && gas_status & GAS_VALID != 0)
            .then(|| gas_resistance_ohms(adc_gas, gas_status & 0x0F));

        Ok(Measurement {
            temperature_x100: Calibration::temperature_x100(t_fine),
            humidity_x1000: calibration.humidity_x1000(adc_hum, t_fine),
            gas_ohms,
            heat_stable: gas_status & HEAT_STAB != 0,
        })
    }

    /// Give back the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Write heater set-points, one per step: (target °C, duration ms)
    fn program_heater(&mut self, steps: &[(i32, u32)]) -> Result<(), DriverError> {
        let calibration = self.calibration.ok_or(DriverError::NotPresent)?;
        if steps.is_empty() || steps.len() > HEATER_SET_POINTS {
            return Err(DriverError::UnsupportedProfile);
        }

        let mut wait_ms = [0u32; HEATER_SET_POINTS];
        for (slot, &(target_c, duration_ms)) in steps.iter().enumerate() {
            let res_heat = calibration.heater_resistance(target_c, AMBIENT_TEMP_C);
            self.write(reg::RES_HEAT_0 + slot as u8, res_heat)?;
            self.write(reg::GAS_WAIT_0 + slot as u8, gas_wait(duration_ms))?;
            wait_ms[slot] = duration_ms.min(MAX_GAS_WAIT_MS);
        }

        self.heater_wait_ms = wait_ms;
        self.heater_steps = steps.len();
        Ok(())
    }

    fn wait_for_data(&mut self) -> Result<[u8; FIELD_LEN], DriverError> {
        let mut field = [0u8; FIELD_LEN];
        for _ in 0..POLL_ATTEMPTS {
            self.read(reg::FIELD_0, &mut field)?;
            if field[0] & NEW_DATA != 0 {
                return Ok(field);
            }
            self.delay.delay_ms(POLL_INTERVAL_MS);
        }
        Err(DriverError::Timeout)
    }

    fn check_index(sensor_index: usize) -> Result<(), DriverError> {
        if sensor_index == 0 {
            Ok(())
        } else {
            Err(DriverError::InvalidSensorIndex)
        }
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), DriverError> {
        self.i2c
            .write_register(self.address, register, value)
            .map_err(|_| DriverError::Bus)
    }

    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), DriverError> {
        self.i2c
            .read_registers(self.address, register, buf)
            .map_err(|_| DriverError::Bus)
    }

    fn read_register(&mut self, register: u8) -> Result<u8, DriverError> {
        self.i2c
            .read_register(self.address, register)
            .map_err(|_| DriverError::Bus)
    }
}

impl<I2C: I2cBus, D: DelayNs> SensorDriver for Bme688<I2C, D> {
    fn probe(&mut self) -> Result<(), DriverError> {
        if self.calibration.is_none() {
            return Err(DriverError::NotPresent);
        }
        if self.read_register(reg::CHIP_ID)? != CHIP_ID {
            return Err(DriverError::NotPresent);
        }
        Ok(())
    }

    fn sensor_count(&self) -> usize {
        1
    }

    fn configure_heater_profile(
        &mut self,
        sensor_index: usize,
        profile: &HeaterProfile,
    ) -> Result<(), DriverError> {
        Self::check_index(sensor_index)?;
        let time_base = u32::try_from(profile.time_base).map_err(|_| DriverError::UnsupportedProfile)?;

        let mut steps: Vec<(i32, u32), HEATER_SET_POINTS> = Vec::new();
        for vector in &profile.vectors {
            let duration_ms = u32::try_from(vector.duration)
                .ok()
                .and_then(|d| d.checked_mul(time_base))
                .ok_or(DriverError::UnsupportedProfile)?;
            steps
                .push((vector.temperature, duration_ms))
                .map_err(|_| DriverError::UnsupportedProfile)?;
        }

        self.program_heater(&steps)
    }

    fn configure_duty_cycle(
        &mut self,
        sensor_index: usize,
        profile: &DutyCycleProfile,
    ) -> Result<(), DriverError> {
        Self::check_index(sensor_index)?;
        self.duty_cycle = Some(profile.clone());
        Ok(())
    }

    fn read_temperature_x100(&mut self, sensor_index: usize) -> Result<i32, DriverError> {
        Self::check_index(sensor_index)?;
        Ok(self.measure(None)?.temperature_x100)
    }

    fn read_humidity_x1000(&mut self, sensor_index: usize) -> Result<u32, DriverError> {
        Self::check_index(sensor_index)?;
        Ok(self.measure(None)?.humidity_x1000)
    }

    fn read_gas_ohms(&mut self, sensor_index: usize, heater_step: u8) -> Result<u32, DriverError> {
        Self::check_index(sensor_index)?;
        self.measure(Some(heater_step))?
            .gas_ohms
            .ok_or(DriverError::Timeout)
    }
}
