use serde::{Deserialize, Serialize};

use super::{BankGeometry, Translation};

/// MBC5: 9-bit ROM bank (bank 0 is selectable in the switchable window)
/// and 4-bit RAM bank. The rumble motor bit is ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Mbc5 {
    ram_enabled: bool,
    rom_bank: u16,
    ram_bank: u8,
}

impl Default for Mbc5 {
    fn default() -> Self {
        Self {
            ram_enabled: false,
            rom_bank: 1,
            ram_bank: 0,
        }
    }
}

impl Mbc5 {
    pub(super) fn translate(&self, addr: u16, geometry: &BankGeometry) -> Translation {
        match addr {
            0x0000..=0x3FFF => Translation::Rom(geometry.rom_offset(0, addr)),
            0x4000..=0x7FFF => {
                Translation::Rom(geometry.rom_offset(usize::from(self.rom_bank), addr))
            }
            0xA000..=0xBFFF if self.ram_enabled && geometry.ram_banks > 0 => {
                Translation::Ram(geometry.ram_offset(usize::from(self.ram_bank), addr))
            }
            _ => Translation::Unmapped,
        }
    }

    pub(super) fn write_control(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            0x2000..=0x2FFF => self.rom_bank = (self.rom_bank & 0x100) | u16::from(value),
            0x3000..=0x3FFF => {
                self.rom_bank = (self.rom_bank & 0x0FF) | (u16::from(value & 0x01) << 8)
            }
            0x4000..=0x5FFF => self.ram_bank = value & 0x0F,
            _ => {}
        }
    }
}
