pub mod config;
pub mod cpu;
pub mod error;
pub mod interrupts;
pub mod machine;

pub use config::{EmulatorConfig, RamInit};
pub use error::{ExecutionError, LoadError, SnapshotError};
pub use machine::{Button, CartridgeHeader, Framebuffer, GameBoy, PpuMode, Snapshot};

/// Logical screen width in pixels for the Game Boy DMG.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
/// T-cycles in one full LCD refresh (154 lines of 456 dots).
pub const CYCLES_PER_FRAME: u32 = 70_224;
