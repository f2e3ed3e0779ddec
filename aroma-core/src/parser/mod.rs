//! Configuration document parser
//!
//! Turns the raw JSON bytes read from storage into a typed
//! [`Configuration`]. Parsing is two passes over the input:
//!
//! 1. `serde_json` reads the whole document into a [`Value`] tree. Any
//!    failure here is reported as [`ParseError::Syntax`] with the byte
//!    offset where the reader gave up.
//! 2. The tree is walked against the schema. Required fields that are
//!    missing or hold the wrong JSON type are reported as
//!    [`ParseError::SchemaMismatch`] with the path of the field.
//!
//! Unknown keys are ignored at every level. If a key appears twice in one
//! object the last occurrence wins. Referential integrity is not checked
//! here; that is the validator's job.

pub mod path;

use core::fmt;

use heapless::{String, Vec};
use serde_json::Value;

use crate::config::{
    ConfigHeader, Configuration, DutyCycleProfile, HeaterProfile, SensorAssignment,
    TemperatureTimeVector,
};
pub use path::FieldPath;

type Object = serde_json::Map<alloc::string::String, Value>;

/// Parse errors
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Not well-formed JSON; byte offset of the offending byte
    Syntax(usize),
    /// Well-formed, but a required field is missing or has the wrong type
    SchemaMismatch(FieldPath),
    /// A string or list is longer than its fixed capacity
    CapacityExceeded(FieldPath),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax(offset) => write!(f, "malformed JSON at byte {}", offset),
            ParseError::SchemaMismatch(path) => {
                write!(f, "missing or mistyped field: {}", path)
            }
            ParseError::CapacityExceeded(path) => write!(f, "too large: {}", path),
        }
    }
}

/// Parse a configuration document
pub fn parse_config(input: &[u8]) -> Result<Configuration, ParseError> {
    let document: Value = serde_json::from_slice(input).map_err(|e| syntax_error(input, &e))?;

    let root = FieldPath::root();
    let object = as_object(&document, &root)?;
    let section = |key: &str| required(object, &root, key).map(|value| (value, root.key(key)));

    let (header, path) = section("configHeader")?;
    let header = parse_header(header, &path)?;
    let (body, path) = section("configBody")?;
    let mut config = parse_body(body, &path)?;
    config.header = header;
    Ok(config)
}

/// Convert the reader's 1-based line and column into a byte offset
fn syntax_error(input: &[u8], error: &serde_json::Error) -> ParseError {
    let line_start: usize = input
        .split_inclusive(|&b| b == b'\n')
        .take(error.line().saturating_sub(1))
        .map(<[u8]>::len)
        .sum();
    let offset = line_start + error.column().saturating_sub(1);
    ParseError::Syntax(offset.min(input.len()))
}

fn parse_header(value: &Value, path: &FieldPath) -> Result<ConfigHeader, ParseError> {
    let object = as_object(value, path)?;
    let field = |key: &str| read_string(required(object, path, key)?, &path.key(key));

    Ok(ConfigHeader {
        date_created: field("dateCreated")?,
        app_version: field("appVersion")?,
        board_type: field("boardType")?,
        board_mode: field("boardMode")?,
        board_layout: field("boardLayout")?,
    })
}

/// Parse the body into a configuration with an empty header
fn parse_body(value: &Value, path: &FieldPath) -> Result<Configuration, ParseError> {
    let object = as_object(value, path)?;

    Ok(Configuration {
        header: ConfigHeader::default(),
        heater_profiles: parse_list(object, path, "heaterProfiles", parse_heater_profile)?,
        duty_cycle_profiles: parse_list(
            object,
            path,
            "dutyCycleProfiles",
            parse_duty_cycle_profile,
        )?,
        sensor_assignments: parse_list(
            object,
            path,
            "sensorConfigurations",
            parse_sensor_assignment,
        )?,
    })
}

fn parse_heater_profile(value: &Value, path: &FieldPath) -> Result<HeaterProfile, ParseError> {
    let object = as_object(value, path)?;

    Ok(HeaterProfile {
        id: read_string(required(object, path, "id")?, &path.key("id"))?,
        time_base: read_integer(required(object, path, "timeBase")?, &path.key("timeBase"))?,
        vectors: parse_list(object, path, "temperatureTimeVectors", parse_vector)?,
    })
}

/// A heater step is a `[temperature, duration]` pair
fn parse_vector(value: &Value, path: &FieldPath) -> Result<TemperatureTimeVector, ParseError> {
    match as_array(value, path)? {
        [temperature, duration] => Ok(TemperatureTimeVector::new(
            read_integer(temperature, &path.index(0))?,
            read_integer(duration, &path.index(1))?,
        )),
        _ => Err(ParseError::SchemaMismatch(path.clone())),
    }
}

fn parse_duty_cycle_profile(
    value: &Value,
    path: &FieldPath,
) -> Result<DutyCycleProfile, ParseError> {
    let object = as_object(value, path)?;
    let field = |key: &str| read_integer(required(object, path, key)?, &path.key(key));

    Ok(DutyCycleProfile {
        id: read_string(required(object, path, "id")?, &path.key("id"))?,
        scanning_cycles: field("numberScanningCycles")?,
        sleeping_cycles: field("numberSleepingCycles")?,
    })
}

fn parse_sensor_assignment(
    value: &Value,
    path: &FieldPath,
) -> Result<SensorAssignment, ParseError> {
    let object = as_object(value, path)?;
    let field = |key: &str| read_string(required(object, path, key)?, &path.key(key));

    Ok(SensorAssignment {
        sensor_index: read_integer(
            required(object, path, "sensorIndex")?,
            &path.key("sensorIndex"),
        )?,
        heater_profile: field("heaterProfile")?,
        duty_cycle_profile: field("dutyCycleProfile")?,
    })
}

/// Parse the homogeneous list under `key` into a fixed-capacity vector
fn parse_list<T, F, const N: usize>(
    object: &Object,
    parent: &FieldPath,
    key: &str,
    mut parse_item: F,
) -> Result<Vec<T, N>, ParseError>
where
    F: FnMut(&Value, &FieldPath) -> Result<T, ParseError>,
{
    let path = parent.key(key);
    let values = as_array(required(object, parent, key)?, &path)?;

    let mut items = Vec::new();
    for (i, value) in values.iter().enumerate() {
        let item_path = path.index(i);
        let item = parse_item(value, &item_path)?;
        items
            .push(item)
            .map_err(|_| ParseError::CapacityExceeded(item_path))?;
    }
    Ok(items)
}

fn read_string<const N: usize>(value: &Value, path: &FieldPath) -> Result<String<N>, ParseError> {
    let text = value
        .as_str()
        .ok_or_else(|| ParseError::SchemaMismatch(path.clone()))?;
    String::try_from(text).map_err(|_| ParseError::CapacityExceeded(path.clone()))
}

/// Read an integer; fractions and out-of-range values are schema
/// mismatches
fn read_integer(value: &Value, path: &FieldPath) -> Result<i32, ParseError> {
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| ParseError::SchemaMismatch(path.clone()))
}

fn as_object<'v>(value: &'v Value, path: &FieldPath) -> Result<&'v Object, ParseError> {
    value
        .as_object()
        .ok_or_else(|| ParseError::SchemaMismatch(path.clone()))
}

fn as_array<'v>(value: &'v Value, path: &FieldPath) -> Result<&'v [Value], ParseError> {
    value
        .as_array()
        .map(|values| values.as_slice())
        .ok_or_else(|| ParseError::SchemaMismatch(path.clone()))
}

fn required<'v>(
    object: &'v Object,
    parent: &FieldPath,
    key: &str,
) -> Result<&'v Value, ParseError> {
    object
        .get(key)
        .ok_or_else(|| ParseError::SchemaMismatch(parent.key(key)))
}
