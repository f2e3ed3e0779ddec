//! In-memory storage for host-side tests
//!
//! [`MemoryStorage`] behaves like a freshly flashed partition: empty until
//! written, with optional fault injection for every operation.

use heapless::{LinearMap, Vec};

use crate::flash::{FlashError, FlashStorage, StorageKey};

/// Largest entry the mock accepts
pub const MOCK_ENTRY_CAPACITY: usize = 4096;

/// Number of distinct keys the mock can hold
const MOCK_KEYS: usize = 4;

/// Mock flash storage
///
/// Supports:
/// - Preloading entries (including malformed ones)
/// - Simulating an unformatted partition that `mount` has to format
/// - Forcing mount/read/write/lookup failures
/// - Counting writes and erases for idempotence checks
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: LinearMap<u8, Vec<u8, MOCK_ENTRY_CAPACITY>, MOCK_KEYS>,
    unformatted: bool,
    mount_error: Option<FlashError>,
    read_error: Option<FlashError>,
    write_error: Option<FlashError>,
    exists_error: Option<FlashError>,
    mounts: u32,
    writes: u32,
    erases: u32,
}

impl MemoryStorage {
    /// Create an empty, formatted storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage whose partition holds garbage until formatted
    pub fn unformatted() -> Self {
        Self {
            unformatted: true,
            ..Self::default()
        }
    }

    /// Preload an entry without counting it as a write
    pub fn insert(&mut self, key: StorageKey, data: &[u8]) {
        let mut value = Vec::new();
        // Test fixtures never exceed the capacity; truncate if one does.
        let len = data.len().min(MOCK_ENTRY_CAPACITY);
        let _ = value.extend_from_slice(&data[..len]);
        let _ = self.entries.insert(key.as_u8(), value);
    }

    /// Current contents of an entry
    pub fn contents(&self, key: StorageKey) -> Option<&[u8]> {
        self.entries.get(&key.as_u8()).map(|v| v.as_slice())
    }

    /// Make every subsequent `mount` fail
    pub fn fail_mount(&mut self, error: FlashError) {
        self.mount_error = Some(error);
    }

    /// Make every subsequent `read` fail
    pub fn fail_reads(&mut self, error: FlashError) {
        self.read_error = Some(error);
    }

    /// Make every subsequent `write` fail
    pub fn fail_writes(&mut self, error: FlashError) {
        self.write_error = Some(error);
    }

    /// Make every subsequent `exists` fail
    pub fn fail_exists(&mut self, error: FlashError) {
        self.exists_error = Some(error);
    }

    /// Number of successful mounts
    pub fn mount_count(&self) -> u32 {
        self.mounts
    }

    /// Number of successful writes
    pub fn write_count(&self) -> u32 {
        self.writes
    }

    /// Number of partition erases (including formats during mount)
    pub fn erase_count(&self) -> u32 {
        self.erases
    }
}

impl FlashStorage for MemoryStorage {
    async fn mount(&mut self) -> Result<(), FlashError> {
        if let Some(e) = self.mount_error {
            return Err(e);
        }
        if self.unformatted {
            self.erase_all().await?;
            self.unformatted = false;
        }
        self.mounts += 1;
        Ok(())
    }

    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        if let Some(e) = self.read_error {
            return Err(e);
        }
        if self.unformatted {
            return Err(FlashError::Corrupted);
        }
        let data = self
            .entries
            .get(&key.as_u8())
            .ok_or(FlashError::NotFound)?;
        if buffer.len() < data.len() {
            return Err(FlashError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if let Some(e) = self.write_error {
            return Err(e);
        }
        if self.unformatted {
            return Err(FlashError::Corrupted);
        }
        let value = Vec::from_slice(data).map_err(|_| FlashError::Full)?;
        self.entries
            .insert(key.as_u8(), value)
            .map_err(|_| FlashError::Full)?;
        self.writes += 1;
        Ok(())
    }

    async fn exists(&mut self, key: StorageKey) -> Result<bool, FlashError> {
        if let Some(e) = self.exists_error {
            return Err(e);
        }
        if self.unformatted {
            return Err(FlashError::Corrupted);
        }
        Ok(self.entries.contains_key(&key.as_u8()))
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        self.entries.clear();
        self.erases += 1;
        Ok(())
    }
}
