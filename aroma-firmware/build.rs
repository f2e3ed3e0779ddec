//! Build script for aroma-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates the compiled-in default configuration

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use aroma_core::config::DEFAULT_CONFIG;
use aroma_core::parser::parse_config;
use aroma_core::store::MAX_CONFIG_SIZE;
use aroma_core::validator::check;

fn main() {
    setup_linker();
    validate_default_config();
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse and validate the default configuration document
///
/// The firmware writes this document to flash on first boot, so a
/// broken default would leave every new board unconfigured.
fn validate_default_config() {
    println!("cargo:rerun-if-changed=../aroma-core/src/config/default_config.json");

    if DEFAULT_CONFIG.len() > MAX_CONFIG_SIZE {
        fail(
            "Default configuration is too large",
            &[format!(
                "{} bytes, the firmware reads at most {} bytes",
                DEFAULT_CONFIG.len(),
                MAX_CONFIG_SIZE
            )],
        );
    }

    let config = match parse_config(DEFAULT_CONFIG.as_bytes()) {
        Ok(config) => config,
        Err(e) => fail("Default configuration does not parse", &[e.to_string()]),
    };

    if let Err(e) = check(&config) {
        fail("Default configuration is invalid", &[e.to_string()]);
    }

    println!(
        "cargo:warning=default configuration validated: {} heater profile(s), {} duty cycle profile(s), {} sensor(s)",
        config.heater_profiles.len(),
        config.duty_cycle_profiles.len(),
        config.sensor_assignments.len()
    );
}

/// Abort the build with a boxed error message
fn fail(title: &str, details: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ║  (aroma-core/src/config/default_config.json)                     ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        details
            .iter()
            .map(|d| format_error_lines(d))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
