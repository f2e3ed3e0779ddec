//! Boot-time configuration sequence
//!
//! Runs the stages once, strictly in order:
//!
//! ```text
//! ensure_initialized → read_raw → parse_config → validate → apply
//! ```
//!
//! The first failing stage ends the sequence. The caller logs the error
//! and keeps running with whatever state the sensor already has.

use core::fmt;

use aroma_hal::FlashStorage;

use crate::applier::{apply, ApplyError, ApplyReport};
use crate::config::Configuration;
use crate::parser::{parse_config, ParseError};
use crate::store::{Bootstrap, ConfigStore, StorageError};
use crate::traits::SensorDriver;
use crate::validator::{validate, ValidationError};

/// Failure of one boot stage
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError {
    Storage(StorageError),
    Parse(ParseError),
    Validation(ValidationError),
    Apply(ApplyError),
}

impl BootError {
    /// Name of the stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            BootError::Storage(_) => "storage",
            BootError::Parse(_) => "parse",
            BootError::Validation(_) => "validation",
            BootError::Apply(_) => "apply",
        }
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootError::Storage(e) => write!(f, "{} stage: {}", self.stage(), e),
            BootError::Parse(e) => write!(f, "{} stage: {}", self.stage(), e),
            BootError::Validation(e) => write!(f, "{} stage: {}", self.stage(), e),
            BootError::Apply(e) => write!(f, "{} stage: {}", self.stage(), e),
        }
    }
}

impl From<StorageError> for BootError {
    fn from(e: StorageError) -> Self {
        BootError::Storage(e)
    }
}

impl From<ParseError> for BootError {
    fn from(e: ParseError) -> Self {
        BootError::Parse(e)
    }
}

impl From<ValidationError> for BootError {
    fn from(e: ValidationError) -> Self {
        BootError::Validation(e)
    }
}

impl From<ApplyError> for BootError {
    fn from(e: ApplyError) -> Self {
        BootError::Apply(e)
    }
}

/// Everything a successful boot sequence produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootOutcome {
    /// Whether the default had to be written
    pub bootstrap: Bootstrap,
    /// The validated configuration
    pub config: Configuration,
    /// Per-slot apply results
    pub report: ApplyReport,
}

/// Load, check and apply the stored configuration
///
/// `buffer` receives the raw document and must be large enough to hold
/// it (see [`crate::store::MAX_CONFIG_SIZE`]).
pub async fn configure_sensors<S, D>(
    store: &mut ConfigStore<S>,
    driver: &mut D,
    buffer: &mut [u8],
) -> Result<BootOutcome, BootError>
where
    S: FlashStorage,
    D: SensorDriver,
{
    let bootstrap = store.ensure_initialized().await?;
    let raw = store.read_raw(buffer).await?;
    let config = validate(parse_config(raw)?)?;
    let report = apply(&config, driver)?;

    Ok(BootOutcome {
        bootstrap,
        config,
        report,
    })
}

#[cfg(test)]
mod tests {
    use aroma_hal::mock::MemoryStorage;
    use aroma_hal::{FlashError, StorageKey};
    use embassy_futures::block_on;

    use super::*;
    use crate::parser::FieldPath;
    use crate::store::MAX_CONFIG_SIZE;
    use crate::test_support::{default_configuration, FakeDriver};

    const DUPLICATE_HEATERS: &str = r#"{
        "configHeader": {"dateCreated": "", "appVersion": "", "boardType": "",
                         "boardMode": "", "boardLayout": ""},
        "configBody": {
            "heaterProfiles": [
                {"id": "h1", "timeBase": 10, "temperatureTimeVectors": [[300, 5]]},
                {"id": "h1", "timeBase": 20, "temperatureTimeVectors": [[200, 5]]}
            ],
            "dutyCycleProfiles": [{"id": "d1", "numberScanningCycles": 2, "numberSleepingCycles": 3}],
            "sensorConfigurations": [{"sensorIndex": 0, "heaterProfile": "h1", "dutyCycleProfile": "d1"}]
        }
    }"#;

    const MISSING_TIME_BASE: &str = r#"{
        "configHeader": {"dateCreated": "", "appVersion": "", "boardType": "",
                         "boardMode": "", "boardLayout": ""},
        "configBody": {
            "heaterProfiles": [{"id": "h1", "temperatureTimeVectors": [[300, 5]]}],
            "dutyCycleProfiles": [],
            "sensorConfigurations": []
        }
    }"#;

    fn run(
        store: &mut ConfigStore<MemoryStorage>,
        driver: &mut FakeDriver,
    ) -> Result<BootOutcome, BootError> {
        let mut buf = [0u8; MAX_CONFIG_SIZE];
        block_on(configure_sensors(store, driver, &mut buf))
    }

    fn store_with(document: &str) -> ConfigStore<MemoryStorage> {
        let mut storage = MemoryStorage::new();
        storage.insert(StorageKey::SensorConfig, document.as_bytes());
        ConfigStore::new(storage)
    }

    #[test]
    fn test_first_boot_applies_default() {
        let mut store = ConfigStore::new(MemoryStorage::new());
        let mut driver = FakeDriver::with_sensors(1);

        let outcome = run(&mut store, &mut driver).unwrap();
        assert_eq!(outcome.bootstrap, Bootstrap::Created);
        assert_eq!(outcome.config, default_configuration());
        assert_eq!(outcome.report.applied.as_slice(), &[0]);
        assert_eq!(outcome.report.skipped.len(), 7);

        let outcome = run(&mut store, &mut driver).unwrap();
        assert_eq!(outcome.bootstrap, Bootstrap::Existing);
        assert_eq!(store.storage().write_count(), 1);
    }

    #[test]
    fn test_malformed_document_stops_before_driver() {
        let mut store = store_with("{\"configHeader\": ");
        let mut driver = FakeDriver::with_sensors(1);

        let err = run(&mut store, &mut driver).unwrap_err();
        assert!(matches!(err, BootError::Parse(ParseError::Syntax(_))));
        assert_eq!(err.stage(), "parse");
        assert_eq!(driver.probes, 0);
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_schema_mismatch_never_reaches_validation() {
        let mut store = store_with(MISSING_TIME_BASE);
        let mut driver = FakeDriver::with_sensors(1);

        assert_eq!(
            run(&mut store, &mut driver),
            Err(BootError::Parse(ParseError::SchemaMismatch(FieldPath::from(
                "configBody.heaterProfiles[0].timeBase"
            ))))
        );
        assert_eq!(driver.probes, 0);
    }

    #[test]
    fn test_invalid_document_blocks_every_sensor() {
        let mut store = store_with(DUPLICATE_HEATERS);
        let mut driver = FakeDriver::with_sensors(1);

        assert_eq!(
            run(&mut store, &mut driver),
            Err(BootError::Validation(ValidationError::DuplicateHeaterProfileId(
                "h1".try_into().unwrap()
            )))
        );
        assert!(driver.heater_calls.is_empty());
        assert_eq!(
            store.storage().contents(StorageKey::SensorConfig),
            Some(DUPLICATE_HEATERS.as_bytes())
        );
    }

    #[test]
    fn test_storage_failure() {
        let mut storage = MemoryStorage::new();
        storage.fail_mount(FlashError::Flash);
        let mut store = ConfigStore::new(storage);
        let mut driver = FakeDriver::with_sensors(1);

        assert_eq!(
            run(&mut store, &mut driver),
            Err(BootError::Storage(StorageError::MountFailed(FlashError::Flash)))
        );
    }

    #[test]
    fn test_missing_driver() {
        let mut store = ConfigStore::new(MemoryStorage::new());
        let mut driver = FakeDriver::absent();

        let err = run(&mut store, &mut driver).unwrap_err();
        assert_eq!(
            err,
            BootError::Apply(ApplyError::DriverUnavailable(
                crate::traits::DriverError::NotPresent
            ))
        );
        assert_eq!(err.stage(), "apply");
    }
}
