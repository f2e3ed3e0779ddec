//! BME688 factory calibration and compensation
//!
//! Integer-only compensation following Bosch's reference formulas. Raw ADC
//! values from the data field are turned into physical units using the
//! per-device trimming parameters read out during bring-up.

/// Length of the first calibration block (starts at 0x8A)
pub const COEFF1_LEN: usize = 23;
/// Length of the second calibration block (starts at 0xE1)
pub const COEFF2_LEN: usize = 14;
/// Length of the third calibration block (starts at 0x00)
pub const COEFF3_LEN: usize = 5;

/// Highest heater target the sensor supports (°C)
pub const MAX_HEATER_TEMP_C: i32 = 400;

/// Longest heater duration `gas_wait` can express (63 × 64 ms)
pub const MAX_GAS_WAIT_MS: u32 = 4032;

/// Per-device calibration parameters
///
/// Pressure parameters are not read; pressure is not reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub par_t1: u16,
    pub par_t2: i16,
    pub par_t3: i8,
    pub par_h1: u16,
    pub par_h2: u16,
    pub par_h3: i8,
    pub par_h4: i8,
    pub par_h5: i8,
    pub par_h6: u8,
    pub par_h7: i8,
    pub par_gh1: i8,
    pub par_gh2: i16,
    pub par_gh3: i8,
    /// Heater resistance range (2 bits)
    pub res_heat_range: u8,
    /// Heater resistance correction
    pub res_heat_val: i8,
}

impl Calibration {
    /// Decode the three calibration register blocks
    pub fn from_registers(
        coeff1: &[u8; COEFF1_LEN],
        coeff2: &[u8; COEFF2_LEN],
        coeff3: &[u8; COEFF3_LEN],
    ) -> Self {
        Self {
            par_t1: u16::from_le_bytes([coeff2[8], coeff2[9]]),
            par_t2: i16::from_le_bytes([coeff1[0], coeff1[1]]),
            par_t3: coeff1[2] as i8,
            // H1 and H2 share the nibbles of 0xE2
            par_h1: (u16::from(coeff2[2]) << 4) | u16::from(coeff2[1] & 0x0F),
            par_h2: (u16::from(coeff2[0]) << 4) | u16::from(coeff2[1] >> 4),
            par_h3: coeff2[3] as i8,
            par_h4: coeff2[4] as i8,
            par_h5: coeff2[5] as i8,
            par_h6: coeff2[6],
            par_h7: coeff2[7] as i8,
            par_gh1: coeff2[12] as i8,
            par_gh2: i16::from_le_bytes([coeff2[10], coeff2[11]]),
            par_gh3: coeff2[13] as i8,
            res_heat_range: (coeff3[2] & 0x30) >> 4,
            res_heat_val: coeff3[0] as i8,
        }
    }

    /// Fine temperature from the 20-bit temperature ADC value
    ///
    /// Humidity compensation needs this as well as temperature.
    pub fn t_fine(&self, adc_temp: u32) -> i32 {
        let var1 = (i64::from(adc_temp) >> 3) - (i64::from(self.par_t1) << 1);
        let var2 = (var1 * i64::from(self.par_t2)) >> 11;
        let var3 = ((var1 >> 1) * (var1 >> 1)) >> 12;
        let var3 = (var3 * (i64::from(self.par_t3) << 4)) >> 14;
        (var2 + var3) as i32
    }

    /// Temperature in 0.01°C from a fine temperature
    pub fn temperature_x100(t_fine: i32) -> i32 {
        ((i64::from(t_fine) * 5 + 128) >> 8) as i32
    }

    /// Relative humidity in 0.001 %RH, clamped to 0..=100%
    pub fn humidity_x1000(&self, adc_hum: u16, t_fine: i32) -> u32 {
        let temp_scaled = i64::from(Self::temperature_x100(t_fine));
        let h1 = i64::from(self.par_h1);
        let h2 = i64::from(self.par_h2);
        let h3 = i64::from(self.par_h3);
        let h4 = i64::from(self.par_h4);
        let h5 = i64::from(self.par_h5);
        let h6 = i64::from(self.par_h6);
        let h7 = i64::from(self.par_h7);

        let var1 = (i64::from(adc_hum) - h1 * 16) - (((temp_scaled * h3) / 100) >> 1);
        let var2 = (h2
            * (((temp_scaled * h4) / 100)
                + (((temp_scaled * ((temp_scaled * h5) / 100)) >> 6) / 100)
                + (1 << 14)))
            >> 10;
        let var3 = var1 * var2;
        let var4 = ((h6 << 7) + ((temp_scaled * h7) / 100)) >> 4;
        let var5 = ((var3 >> 14) * (var3 >> 14)) >> 10;
        let var6 = (var4 * var5) >> 1;
        let humidity = (((var3 + var6) >> 10) * 1000) >> 12;

        humidity.clamp(0, 100_000) as u32
    }

    /// `res_heat_x` register value for a heater target temperature
    ///
    /// Targets are clamped to `0..=400`°C.
    pub fn heater_resistance(&self, target_c: i32, ambient_c: i32) -> u8 {
        let target = i64::from(target_c.clamp(0, MAX_HEATER_TEMP_C));
        let ambient = i64::from(ambient_c);
        let gh1 = i64::from(self.par_gh1);
        let gh2 = i64::from(self.par_gh2);
        let gh3 = i64::from(self.par_gh3);

        let var1 = ((ambient * gh3) / 1000) * 256;
        let var2 = (gh1 + 784) * (((((gh2 + 154_009) * target * 5) / 100) + 3_276_800) / 10);
        let var3 = var1 + var2 / 2;
        let var4 = var3 / (i64::from(self.res_heat_range) + 4);
        let var5 = 131 * i64::from(self.res_heat_val) + 65_536;
        let res_x100 = ((var4 / var5) - 250) * 34;

        ((res_x100 + 50) / 100).clamp(0, i64::from(u8::MAX)) as u8
    }
}

/// Gas resistance in ohms from the 10-bit gas ADC value and range
pub fn gas_resistance_ohms(adc_gas: u16, range: u8) -> u32 {
    let var1 = 262_144u32 >> (range & 0x0F);
    let var2 = (4096 + 3 * (i32::from(adc_gas.min(1023)) - 512)) as u32;
    (10_000 * var1 / var2) * 100
}

/// Encode a heater duration for a `gas_wait_x` register
///
/// Six bits of duration with a 1/4/16/64 multiplier in the top two bits.
/// Durations the register cannot express saturate at the maximum.
pub fn gas_wait(duration_ms: u32) -> u8 {
    if duration_ms >= 0xFC0 {
        return 0xFF;
    }
    let mut duration = duration_ms;
    let mut factor = 0u8;
    while duration > 0x3F {
        duration /= 4;
        factor += 1;
    }
    duration as u8 + factor * 64
}
