//! I2C bus access
//!
//! Register-level access for I2C sensors. Chip HALs implement the three
//! raw transfers; register helpers come for free.

/// I2C bus master
pub trait I2cBus {
    /// Transfer error
    type Error;

    /// Write `data` to the 7-bit `address`
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Fill `buf` from the 7-bit `address`
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read with a repeated start
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Set one 8-bit register
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write(address, &[register, value])
    }

    /// Read `buf.len()` consecutive registers from `register` on
    ///
    /// Relies on the device auto-incrementing its register pointer.
    fn read_registers(
        &mut self,
        address: u8,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write_read(address, &[register], buf)
    }

    /// Read one 8-bit register
    fn read_register(&mut self, address: u8, register: u8) -> Result<u8, Self::Error> {
        let mut value = [0u8];
        self.read_registers(address, register, &mut value)?;
        Ok(value[0])
    }
}
