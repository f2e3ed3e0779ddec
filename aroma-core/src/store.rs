//! Configuration storage
//!
//! Owns the flash storage handle and the single persisted configuration
//! entry. On first boot the compiled-in default is written; an existing
//! entry is never replaced, even if it no longer parses.

use core::fmt;

use aroma_hal::{FlashError, FlashStorage, StorageKey};

use crate::config::DEFAULT_CONFIG;

/// Maximum size of the stored configuration document
///
/// Callers size their read buffer with this.
pub const MAX_CONFIG_SIZE: usize = 3072;

const CONFIG_KEY: StorageKey = StorageKey::SensorConfig;

/// Storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// The storage medium could not be mounted
    MountFailed(FlashError),
    /// No configuration entry exists
    NotFound,
    /// The entry exists but could not be read
    ReadFailed(FlashError),
    /// The default configuration could not be written
    WriteFailed(FlashError),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::MountFailed(e) => write!(f, "mount failed: {}", e),
            StorageError::NotFound => write!(f, "no stored configuration"),
            StorageError::ReadFailed(e) => write!(f, "read failed: {}", e),
            StorageError::WriteFailed(e) => write!(f, "write failed: {}", e),
        }
    }
}

/// Outcome of [`ConfigStore::ensure_initialized`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bootstrap {
    /// No entry existed; the compiled-in default was written
    Created,
    /// An entry already existed and was left untouched
    Existing,
}

/// Persisted configuration entry
pub struct ConfigStore<S> {
    storage: S,
    mounted: bool,
}

impl<S: FlashStorage> ConfigStore<S> {
    /// Wrap a storage handle
    ///
    /// Nothing is touched until the first operation.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            mounted: false,
        }
    }

    /// Make sure a configuration entry exists
    ///
    /// Writes [`DEFAULT_CONFIG`] if and only if there is no entry. Calling
    /// this again never changes the stored bytes. If the lookup itself
    /// fails nothing is written.
    pub async fn ensure_initialized(&mut self) -> Result<Bootstrap, StorageError> {
        self.mount().await?;

        let exists = self
            .storage
            .exists(CONFIG_KEY)
            .await
            .map_err(StorageError::ReadFailed)?;
        if exists {
            return Ok(Bootstrap::Existing);
        }

        self.storage
            .write(CONFIG_KEY, DEFAULT_CONFIG.as_bytes())
            .await
            .map_err(StorageError::WriteFailed)?;
        Ok(Bootstrap::Created)
    }

    /// Read the stored document into `buffer`
    ///
    /// Returns the filled prefix of the buffer.
    pub async fn read_raw<'b>(&mut self, buffer: &'b mut [u8]) -> Result<&'b [u8], StorageError> {
        self.mount().await?;

        match self.storage.read(CONFIG_KEY, buffer).await {
            Ok(len) => Ok(&buffer[..len]),
            Err(FlashError::NotFound) => Err(StorageError::NotFound),
            Err(e) => Err(StorageError::ReadFailed(e)),
        }
    }

    /// Get a reference to the storage handle
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give the storage handle back
    pub fn into_storage(self) -> S {
        self.storage
    }

    async fn mount(&mut self) -> Result<(), StorageError> {
        if !self.mounted {
            self.storage
                .mount()
                .await
                .map_err(StorageError::MountFailed)?;
            self.mounted = true;
        }
        Ok(())
    }
}
