//! The DMG machine: cartridge, bus, peripherals and the session API.

mod bus;
mod cartridge;
mod gameboy;
mod ppu;
mod serial;
mod snapshot;
mod timer;

#[cfg(test)]
mod tests;

pub use bus::Button;
pub use cartridge::CartridgeHeader;
pub use gameboy::GameBoy;
pub use ppu::{Framebuffer, PpuMode};
pub use snapshot::Snapshot;
