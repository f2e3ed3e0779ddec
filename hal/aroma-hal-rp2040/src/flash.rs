//! RP2040 flash key/value storage
//!
//! Entries live in a `sequential-storage` map occupying the last 64KB of
//! the Pico's 2MB flash. The map handles wear levelling and CRCs; this
//! module only translates its errors.

use core::ops::Range;

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use aroma_hal::flash::{FlashError, StorageKey};

/// Total flash on the board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
/// Size of the storage partition at the end of flash
pub const PARTITION_SIZE: usize = 64 * 1024;
/// First byte of the storage partition
pub const PARTITION_START: usize = FLASH_SIZE - PARTITION_SIZE;

/// Flash range handed to `sequential-storage`
pub const PARTITION_RANGE: Range<u32> = (PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch space for one map item
///
/// Items cannot span erase pages, so one page bounds the largest entry.
const ITEM_BUFFER_SIZE: usize = ERASE_SIZE;

type SsError = sequential_storage::Error<embassy_rp::flash::Error>;

/// Flash-backed [`aroma_hal::FlashStorage`]
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Take the flash peripheral and a DMA channel for reads
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Look up `key`, handing the value (if any) to `f`
    async fn fetch<R>(
        &mut self,
        key: StorageKey,
        f: impl FnOnce(Option<&[u8]>) -> R,
    ) -> Result<R, SsError> {
        let mut item_buffer = [0u8; ITEM_BUFFER_SIZE];
        let value = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            PARTITION_RANGE,
            &mut NoCache::new(),
            &mut item_buffer,
            &key,
        )
        .await?;
        Ok(f(value))
    }
}

impl aroma_hal::FlashStorage for Rp2040FlashStorage<'_> {
    async fn mount(&mut self) -> Result<(), FlashError> {
        match self.fetch(StorageKey::SensorConfig, |_| ()).await {
            Ok(()) => Ok(()),
            // Not a map at all: first boot after flashing
            Err(sequential_storage::Error::Corrupted { .. }) => self.erase_all().await,
            Err(_) => Err(FlashError::Storage),
        }
    }

    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let copied = self
            .fetch(key, |value| {
                let data = value.ok_or(FlashError::NotFound)?;
                let dest = buffer
                    .get_mut(..data.len())
                    .ok_or(FlashError::BufferTooSmall)?;
                dest.copy_from_slice(data);
                Ok(data.len())
            })
            .await;

        match copied {
            Ok(result) => result,
            Err(sequential_storage::Error::Corrupted { .. }) => Err(FlashError::Corrupted),
            Err(_) => Err(FlashError::Storage),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        let mut item_buffer = [0u8; ITEM_BUFFER_SIZE];
        map::store_item(
            &mut self.flash,
            PARTITION_RANGE,
            &mut NoCache::new(),
            &mut item_buffer,
            &key,
            &data,
        )
        .await
        .map_err(|e| match e {
            sequential_storage::Error::FullStorage => FlashError::Full,
            sequential_storage::Error::ItemTooBig => FlashError::BufferTooSmall,
            _ => FlashError::Storage,
        })
    }

    async fn exists(&mut self, key: StorageKey) -> Result<bool, FlashError> {
        match self.fetch(key, |value| value.is_some()).await {
            Ok(found) => Ok(found),
            Err(sequential_storage::Error::Corrupted { .. }) => Err(FlashError::Corrupted),
            Err(_) => Err(FlashError::Storage),
        }
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        self.flash
            .erase(PARTITION_RANGE.start, PARTITION_RANGE.end)
            .await
            .map_err(|_| FlashError::Flash)
    }
}
