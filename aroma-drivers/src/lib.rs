//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in aroma-core:
//!
//! - Gas sensors (Bosch BME688)

#![no_std]
#![deny(unsafe_code)]

pub mod sensor;
