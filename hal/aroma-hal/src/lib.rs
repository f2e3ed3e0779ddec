//! Hardware abstraction for the gas sensor board
//!
//! `aroma-core` and `aroma-drivers` are written against these traits
//! only, so the configuration pipeline and the sensor driver run on the
//! host in tests. `aroma-hal-rp2040` implements them for the board.
//!
//! ```text
//! aroma-firmware
//!   ├── aroma-core ──────┐
//!   └── aroma-drivers ───┤
//!                        ▼
//!                    aroma-hal  ◄── aroma-hal-rp2040
//! ```
//!
//! - [`FlashStorage`]: keyed persistent storage
//! - [`I2cBus`]: register access to I2C sensors
//!
//! The `mock` feature adds an in-memory [`FlashStorage`] for tests.

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod i2c;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use flash::{FlashError, FlashStorage, StorageKey};
pub use i2c::I2cBus;
