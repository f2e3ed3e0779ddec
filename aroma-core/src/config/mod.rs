//! Configuration types
//!
//! Typed form of the persisted sensor configuration document, plus the
//! compiled-in default written on first boot.

pub mod types;

pub use types::*;

/// Compiled-in default configuration document
///
/// Written verbatim to storage when no configuration exists. It must
/// always parse and validate; `aroma-firmware/build.rs` enforces this at
/// build time and the parser tests re-check it.
pub const DEFAULT_CONFIG: &str = include_str!("default_config.json");
