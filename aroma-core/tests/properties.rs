//! Property tests for the configuration pipeline

use aroma_core::config::{
    Configuration, DutyCycleProfile, HeaterProfile, Label, SensorAssignment,
    TemperatureTimeVector, DEFAULT_CONFIG, MAX_HEATER_PROFILES, MAX_HEATER_STEPS,
    MAX_SENSOR_ASSIGNMENTS,
};
use aroma_core::parser::{parse_config, ParseError};
use aroma_core::validator::{check, ValidationError};
use proptest::prelude::*;

fn label(s: &str) -> Label {
    Label::try_from(s).unwrap()
}

/// A configuration whose ids are unique and whose references all resolve
fn consistent_config() -> impl Strategy<Value = Configuration> {
    (1..=MAX_HEATER_PROFILES, 1..=4usize)
        .prop_flat_map(|(heaters, duties)| {
            (
                prop::collection::vec(
                    (
                        1..1000i32,
                        prop::collection::vec((100..400i32, 0..64i32), 1..=MAX_HEATER_STEPS),
                    ),
                    heaters,
                ),
                prop::collection::vec((0..20i32, 0..20i32), duties),
                prop::collection::vec((0..heaters, 0..duties), 0..=MAX_SENSOR_ASSIGNMENTS),
            )
        })
        .prop_map(|(heaters, duties, sensors)| {
            let mut config = Configuration::new();
            for (i, (time_base, steps)) in heaters.into_iter().enumerate() {
                let mut profile = HeaterProfile {
                    id: label(&format!("heater_{}", i)),
                    time_base,
                    ..HeaterProfile::default()
                };
                for (temperature, duration) in steps {
                    profile
                        .vectors
                        .push(TemperatureTimeVector::new(temperature, duration))
                        .unwrap();
                }
                config.heater_profiles.push(profile).unwrap();
            }
            for (i, (scanning, sleeping)) in duties.into_iter().enumerate() {
                config
                    .duty_cycle_profiles
                    .push(DutyCycleProfile {
                        id: label(&format!("duty_{}", i)),
                        // Keep at least one count non-zero
                        scanning_cycles: scanning.max(1 - sleeping.signum()),
                        sleeping_cycles: sleeping,
                    })
                    .unwrap();
            }
            for (index, (heater, duty)) in sensors.into_iter().enumerate() {
                config
                    .sensor_assignments
                    .push(SensorAssignment {
                        sensor_index: index as i32,
                        heater_profile: label(&format!("heater_{}", heater)),
                        duty_cycle_profile: label(&format!("duty_{}", duty)),
                    })
                    .unwrap();
            }
            config
        })
}

/// Replace every whitespace run in `doc` with `spacing[i]` (cycled)
///
/// Only valid for documents with no whitespace inside strings.
fn respace(doc: &str, spacing: &[&str]) -> String {
    let mut out = String::with_capacity(doc.len() * 2);
    let mut run = 0;
    let mut in_space = false;
    for c in doc.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push_str(spacing[run % spacing.len()]);
                run += 1;
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

proptest! {
    #[test]
    fn parse_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse_config(&bytes);
    }

    #[test]
    fn mutated_default_never_panics(
        index in 0..DEFAULT_CONFIG.len(),
        byte in any::<u8>(),
    ) {
        let mut bytes = DEFAULT_CONFIG.as_bytes().to_vec();
        bytes[index] = byte;
        if let Ok(config) = parse_config(&bytes) {
            let _ = check(&config);
        }
    }

    #[test]
    fn truncated_default_is_a_syntax_error(cut in 0..DEFAULT_CONFIG.trim_end().len()) {
        let result = parse_config(&DEFAULT_CONFIG.as_bytes()[..cut]);
        prop_assert!(matches!(result, Err(ParseError::Syntax(_))), "{:?}", result);
    }

    #[test]
    fn whitespace_does_not_matter(
        spacing in prop::collection::vec(prop::sample::select(vec!["", " ", "\n", "\t", "\r\n  "]), 1..8),
    ) {
        let expected = parse_config(DEFAULT_CONFIG.as_bytes()).unwrap();
        let doc = respace(DEFAULT_CONFIG, &spacing);
        prop_assert_eq!(parse_config(doc.as_bytes()), Ok(expected));
    }

    #[test]
    fn consistent_configs_validate(config in consistent_config()) {
        prop_assert_eq!(check(&config), Ok(()));
    }

    #[test]
    fn duplicate_heater_id_is_reported_first(
        config in consistent_config(),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(config.heater_profiles.len() < MAX_HEATER_PROFILES);
        let mut config = config;
        let victim = config.heater_profiles[pick.index(config.heater_profiles.len())].clone();
        let id = victim.id.clone();
        // Break other rules too; the duplicate must still win
        config.heater_profiles.push(HeaterProfile { time_base: 0, ..victim }).unwrap();
        if let Some(duty) = config.duty_cycle_profiles.first_mut() {
            duty.scanning_cycles = -1;
        }
        prop_assert_eq!(check(&config), Err(ValidationError::DuplicateHeaterProfileId(id)));
    }

    #[test]
    fn dangling_duty_reference_names_the_sensor(config in consistent_config()) {
        prop_assume!(!config.sensor_assignments.is_empty());
        let mut config = config;
        let last = config.sensor_assignments.len() - 1;
        config.sensor_assignments[last].duty_cycle_profile = label("missing");
        prop_assert_eq!(
            check(&config),
            Err(ValidationError::DanglingReference {
                sensor_index: last as i32,
                kind: aroma_core::validator::ReferenceKind::DutyCycle,
                missing_id: label("missing"),
            })
        );
    }
}
