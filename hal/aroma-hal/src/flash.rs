//! Persistent key/value storage
//!
//! The firmware persists a single document, the sensor configuration, as
//! one opaque byte entry. Wear levelling, integrity checks and placement
//! in flash belong to the implementation.

use core::fmt;
use core::future::Future;

/// Entry identifiers
///
/// Stored on flash as a single byte, so discriminants must never be
/// reused for a different meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Sensor configuration document (JSON text)
    SensorConfig = 0,
}

impl StorageKey {
    /// On-flash byte for this key
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Key for an on-flash byte, if it names one
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::SensorConfig),
            _ => None,
        }
    }
}

/// Storage failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// The flash peripheral reported an error
    Flash,
    /// The storage layer failed for another reason
    Storage,
    /// No entry for the key
    NotFound,
    /// Entry larger than the caller's buffer (or a single flash page)
    BufferTooSmall,
    /// Entry present but unreadable
    Corrupted,
    /// No room left for the entry
    Full,
}

impl fmt::Display for FlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlashError::Flash => "flash operation failed",
            FlashError::Storage => "storage operation failed",
            FlashError::NotFound => "key not found",
            FlashError::BufferTooSmall => "buffer too small",
            FlashError::Corrupted => "data corrupted",
            FlashError::Full => "storage full",
        })
    }
}

/// Key/value storage backed by flash
///
/// Calls are never overlapped: every future is awaited before the next
/// method is called.
pub trait FlashStorage {
    /// Prepare the medium for use
    ///
    /// A partition whose contents cannot be interpreted at all (first
    /// use after flashing) may be formatted here. Readable entries are
    /// left alone.
    fn mount(&mut self) -> impl Future<Output = Result<(), FlashError>>;

    /// Copy the entry for `key` into `buffer`, returning its length
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl Future<Output = Result<usize, FlashError>>;

    /// Store `data` as the entry for `key`, replacing any previous one
    fn write(&mut self, key: StorageKey, data: &[u8])
        -> impl Future<Output = Result<(), FlashError>>;

    /// Whether an entry exists for `key`
    ///
    /// A lookup that cannot complete is an error, not an absent entry.
    fn exists(&mut self, key: StorageKey) -> impl Future<Output = Result<bool, FlashError>>;

    /// Wipe the whole partition
    fn erase_all(&mut self) -> impl Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
mod map_key {
    use sequential_storage::map::{Key, SerializationError};

    use super::StorageKey;

    impl Key for StorageKey {
        fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
            let slot = buffer
                .first_mut()
                .ok_or(SerializationError::BufferTooSmall)?;
            *slot = self.as_u8();
            Ok(1)
        }

        fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
            let byte = buffer.first().ok_or(SerializationError::BufferTooSmall)?;
            StorageKey::from_u8(*byte)
                .map(|key| (key, 1))
                .ok_or(SerializationError::InvalidFormat)
        }
    }
}
