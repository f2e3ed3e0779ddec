//! Board-agnostic core logic for the gas sensor board firmware
//!
//! This crate contains the sensor configuration pipeline and everything
//! it needs that does not depend on a specific chip:
//!
//! - Configuration type definitions and the compiled-in default
//! - Storage bootstrap (`store`)
//! - JSON document parsing into typed configuration (`parser`)
//! - Referential and range validation (`validator`)
//! - Resolution of sensor assignments onto a driver (`applier`)
//! - The boot-time sequence tying the stages together (`pipeline`)
//! - Duty-cycle sampling cadence (`duty`)
//! - The sensor driver capability trait (`traits`)
//!
//! ```text
//! ConfigStore → parse_config → validate → apply → SensorDriver
//! ```

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod applier;
pub mod config;
pub mod duty;
pub mod parser;
pub mod pipeline;
pub mod store;
pub mod traits;
pub mod validator;

#[cfg(test)]
mod test_support;
