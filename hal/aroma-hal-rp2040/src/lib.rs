//! RP2040 support for the gas sensor board
//!
//! - [`flash::Rp2040FlashStorage`]: `aroma_hal::FlashStorage` on the
//!   on-board QSPI flash
//! - [`i2c::BlockingI2c`]: `aroma_hal::I2cBus` over any `embedded-hal`
//!   I2C master

#![no_std]

pub mod flash;
pub mod i2c;

pub use aroma_hal::{FlashStorage as FlashStorageTrait, StorageKey};
