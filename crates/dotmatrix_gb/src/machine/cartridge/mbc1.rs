use serde::{Deserialize, Serialize};

use super::{BankGeometry, Translation};

/// MBC1 banking registers.
///
/// BANK1 (5 bits) selects the switchable ROM bank and never reads back as
/// zero; BANK2 (2 bits) supplies ROM bank bits 5-6, and in mode 1 also
/// the RAM bank and the bank mapped at $0000-$3FFF.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Mbc1 {
    ram_enabled: bool,
    bank1: u8,
    bank2: u8,
    advanced_mode: bool,
}

impl Default for Mbc1 {
    fn default() -> Self {
        Self {
            ram_enabled: false,
            bank1: 1,
            bank2: 0,
            advanced_mode: false,
        }
    }
}

impl Mbc1 {
    pub(super) fn translate(&self, addr: u16, geometry: &BankGeometry) -> Translation {
        match addr {
            0x0000..=0x3FFF => {
                let bank = if self.advanced_mode {
                    usize::from(self.bank2) << 5
                } else {
                    0
                };
                Translation::Rom(geometry.rom_offset(bank, addr))
            }
            0x4000..=0x7FFF => {
                let bank = (usize::from(self.bank2) << 5) | usize::from(self.bank1);
                Translation::Rom(geometry.rom_offset(bank, addr))
            }
            0xA000..=0xBFFF if self.ram_enabled && geometry.ram_banks > 0 => {
                let bank = if self.advanced_mode {
                    usize::from(self.bank2)
                } else {
                    0
                };
                Translation::Ram(geometry.ram_offset(bank, addr))
            }
            _ => Translation::Unmapped,
        }
    }

    pub(super) fn write_control(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            0x2000..=0x3FFF => {
                // Zero is detected on the five written bits only, so
                // $20/$40/$60 still select banks $21/$41/$61.
                self.bank1 = match value & 0x1F {
                    0 => 1,
                    bank => bank,
                };
            }
            0x4000..=0x5FFF => self.bank2 = value & 0x03,
            0x6000..=0x7FFF => self.advanced_mode = value & 0x01 != 0,
            _ => {}
        }
    }
}
