//! Aroma - Gas Sensor Board Firmware
//!
//! Main firmware binary for RP2040-based gas sensor boards.
//!
//! At boot the sensor is brought up, the JSON configuration document is
//! loaded from flash (the compiled-in default is written on first boot),
//! validated and applied. A polling task then samples the sensor on the
//! configured duty cycle.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::i2c::{self, I2c};
use embassy_time::{Delay, Timer};
use embedded_alloc::LlffHeap as Heap;
use {defmt_rtt as _, panic_probe as _};

use aroma_drivers::sensor::Bme688;
use aroma_hal_rp2040::flash::Rp2040FlashStorage;
use aroma_hal_rp2040::i2c::BlockingI2c;

mod board;
mod config;
mod tasks;

// Heap for the JSON document tree during configuration
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 32KB
const HEAP_SIZE: usize = 32 * 1024;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Aroma firmware starting...");

    init_heap();

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // I2C0: SDA=GPIO4, SCL=GPIO5
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = board::I2C_FREQUENCY;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);

    let mut sensor: board::Sensor = Bme688::new(BlockingI2c::new(i2c), Delay, board::SENSOR_ADDRESS);
    match sensor.begin() {
        Ok(()) => info!("BME688 found at {=u8:#x}", board::SENSOR_ADDRESS),
        Err(e) => warn!("BME688 bring-up failed: {}", e),
    }

    // Configuration partition lives in the last 64KB of flash
    let storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let schedules = config::configure(storage, &mut sensor).await;

    spawner.spawn(unwrap!(tasks::poll_task(sensor, schedules)));

    info!("Firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Hand the static heap region to the allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
