use serde::{Deserialize, Serialize};

use super::{cartridge::Cartridge, ppu::Ppu, serial::Serial, timer::Timer};
use crate::config::RamInit;
use crate::interrupts::InterruptController;

mod apu;
mod dma;
mod init;
mod joypad;
mod mmio;
mod traits;

pub use joypad::Button;

use apu::Apu;
use dma::OamDma;
use joypad::Joypad;

const WRAM_SIZE: usize = 0x2000;
const HRAM_SIZE: usize = 0x7F;

/// Every component behind the CPU's address space.
///
/// The bus owns routing only: each address range belongs to exactly one
/// component, which alone mutates its bytes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct GameBoyBus {
    pub(crate) cartridge: Cartridge,
    wram: Vec<u8>,
    hram: Vec<u8>,
    pub(crate) interrupts: InterruptController,
    pub(crate) timer: Timer,
    pub(crate) ppu: Ppu,
    pub(crate) serial: Serial,
    joypad: Joypad,
    apu: Apu,
    dma: OamDma,
}

impl GameBoyBus {
    pub(crate) fn new(cartridge: Cartridge, ram_init: RamInit) -> Self {
        let mut bus = Self {
            cartridge,
            wram: vec![0; WRAM_SIZE],
            hram: vec![0; HRAM_SIZE],
            interrupts: InterruptController::new(),
            timer: Timer::new(),
            ppu: Ppu::new(),
            serial: Serial::default(),
            joypad: Joypad::default(),
            apu: Apu::default(),
            dma: OamDma::default(),
        };
        bus.power_on(ram_init);
        bus
    }

    /// Advance every clocked component by the same `cycles` T-cycles.
    pub(crate) fn advance(&mut self, cycles: u32) {
        self.timer.advance(cycles, &mut self.interrupts);
        self.ppu.advance(cycles, &mut self.interrupts);
        self.serial.advance(cycles, &mut self.interrupts);
        self.apu.advance(cycles);
        self.cartridge.advance(cycles);
        self.advance_dma(cycles);
    }

    pub(crate) fn set_button(&mut self, button: Button, pressed: bool) {
        self.joypad
            .set_pressed(button, pressed, &mut self.interrupts);
    }
}
