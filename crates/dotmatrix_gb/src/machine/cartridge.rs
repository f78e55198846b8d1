use serde::{Deserialize, Serialize};

use crate::error::LoadError;

mod header;
mod mbc1;
mod mbc3;
mod mbc5;
mod rtc;


pub use header::CartridgeHeader;

use mbc1::Mbc1;
use mbc3::Mbc3;
use mbc5::Mbc5;

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

/// Where a CPU address in $0000-$7FFF or $A000-$BFFF lands on the cartridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Translation {
    /// Byte offset into the ROM image.
    Rom(usize),
    /// Byte offset into cartridge RAM.
    Ram(usize),
    /// MBC3 clock register $08-$0C.
    Rtc(u8),
    /// RAM disabled or absent; reads float high and writes are dropped.
    Unmapped,
}

/// Bank counts taken from the header. Both are powers of two (or zero for
/// RAM), so out-of-range bank numbers wrap by masking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BankGeometry {
    pub(crate) rom_banks: usize,
    pub(crate) ram_banks: usize,
}

impl BankGeometry {
    #[inline]
    fn rom_offset(&self, bank: usize, addr: u16) -> usize {
        (bank & (self.rom_banks - 1)) * ROM_BANK_SIZE + usize::from(addr & 0x3FFF)
    }

    #[inline]
    fn ram_offset(&self, bank: usize, addr: u16) -> usize {
        (bank % self.ram_banks.max(1)) * RAM_BANK_SIZE + usize::from(addr & 0x1FFF)
    }
}

/// Bank controller selected by the header's cartridge type byte.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Mbc {
    RomOnly,
    Mbc1(Mbc1),
    Mbc3(Mbc3),
    Mbc5(Mbc5),
}

impl Mbc {
    fn for_type(code: u8) -> Result<Self, LoadError> {
        match code {
            0x00 | 0x08 | 0x09 => Ok(Mbc::RomOnly),
            0x01..=0x03 => Ok(Mbc::Mbc1(Mbc1::default())),
            0x0F | 0x10 => Ok(Mbc::Mbc3(Mbc3::new(true))),
            0x11..=0x13 => Ok(Mbc::Mbc3(Mbc3::new(false))),
            0x19..=0x1E => Ok(Mbc::Mbc5(Mbc5::default())),
            code => Err(LoadError::UnsupportedCartridgeType { code }),
        }
    }

    /// Bank registers back to power-on values. The MBC3 clock keeps running.
    fn reset(&mut self) {
        match self {
            Mbc::RomOnly => {}
            Mbc::Mbc1(m) => *m = Mbc1::default(),
            Mbc::Mbc3(m) => m.reset(),
            Mbc::Mbc5(m) => *m = Mbc5::default(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Mbc::RomOnly => "ROM only",
            Mbc::Mbc1(_) => "MBC1",
            Mbc::Mbc3(_) => "MBC3",
            Mbc::Mbc5(_) => "MBC5",
        }
    }
}

/// A loaded cartridge: ROM image, external RAM and the bank controller.
///
/// The ROM is not part of serialized state; a restored cartridge gets its
/// image back through [`Cartridge::attach_rom`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Cartridge {
    #[serde(skip)]
    rom: Vec<u8>,
    ram: Vec<u8>,
    header: CartridgeHeader,
    geometry: BankGeometry,
    mbc: Mbc,
}

impl Cartridge {
    pub(crate) fn from_rom(rom: &[u8]) -> Result<Self, LoadError> {
        let header = CartridgeHeader::parse(rom)?;
        let mbc = Mbc::for_type(header.cartridge_type)?;
        let geometry = BankGeometry {
            rom_banks: header.rom_bank_count()?,
            ram_banks: header.ram_bank_count()?,
        };

        let expected = geometry.rom_banks * ROM_BANK_SIZE;
        if rom.len() < expected {
            return Err(LoadError::Truncated {
                expected,
                actual: rom.len(),
            });
        }

        let computed = CartridgeHeader::compute_header_checksum(rom);
        if computed != header.header_checksum {
            log::warn!(
                "GB cartridge: header checksum mismatch (header=0x{:02X}, computed=0x{:02X})",
                header.header_checksum,
                computed
            );
        }

        log::info!(
            "GB cartridge: \"{}\" type=0x{:02X} ({}) rom_banks={} ram_banks={}",
            header.title,
            header.cartridge_type,
            mbc.name(),
            geometry.rom_banks,
            geometry.ram_banks
        );

        Ok(Self {
            rom: rom[..expected].to_vec(),
            ram: vec![0xFF; geometry.ram_banks * RAM_BANK_SIZE],
            header,
            geometry,
            mbc,
        })
    }

    pub(crate) fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    /// Hand the ROM image of `other` to this cartridge. Used after restoring
    /// serialized state, which carries everything but the ROM.
    pub(crate) fn attach_rom(&mut self, other: &mut Cartridge) {
        self.rom = std::mem::take(&mut other.rom);
    }

    pub(crate) fn translate(&self, addr: u16) -> Translation {
        match &self.mbc {
            Mbc::RomOnly => match addr {
                0x0000..=0x7FFF => Translation::Rom(usize::from(addr)),
                0xA000..=0xBFFF if self.geometry.ram_banks > 0 => {
                    Translation::Ram(self.geometry.ram_offset(0, addr))
                }
                _ => Translation::Unmapped,
            },
            Mbc::Mbc1(m) => m.translate(addr, &self.geometry),
            Mbc::Mbc3(m) => m.translate(addr, &self.geometry),
            Mbc::Mbc5(m) => m.translate(addr, &self.geometry),
        }
    }

    pub(crate) fn read(&self, addr: u16) -> u8 {
        match self.translate(addr) {
            Translation::Rom(offset) => self.rom.get(offset).copied().unwrap_or(0xFF),
            Translation::Ram(offset) => self.ram.get(offset).copied().unwrap_or(0xFF),
            Translation::Rtc(select) => match &self.mbc {
                Mbc::Mbc3(Mbc3 { rtc: Some(rtc), .. }) => rtc.read(select),
                _ => 0xFF,
            },
            Translation::Unmapped => 0xFF,
        }
    }

    /// Writes to $0000-$7FFF program the bank controller; writes to
    /// $A000-$BFFF go to RAM or the clock.
    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        if addr < 0x8000 {
            log::trace!("GB cartridge: control write 0x{addr:04X} <- 0x{value:02X}");
            match &mut self.mbc {
                Mbc::RomOnly => {}
                Mbc::Mbc1(m) => m.write_control(addr, value),
                Mbc::Mbc3(m) => m.write_control(addr, value),
                Mbc::Mbc5(m) => m.write_control(addr, value),
            }
            return;
        }

        match self.translate(addr) {
            Translation::Ram(offset) => {
                if let Some(byte) = self.ram.get_mut(offset) {
                    *byte = value;
                }
            }
            Translation::Rtc(select) => {
                if let Mbc::Mbc3(Mbc3 { rtc: Some(rtc), .. }) = &mut self.mbc {
                    rtc.write(select, value);
                }
            }
            Translation::Rom(_) | Translation::Unmapped => {}
        }
    }

    pub(crate) fn reset(&mut self) {
        self.mbc.reset();
    }

    /// Advance the cartridge clock, if it has one.
    pub(crate) fn advance(&mut self, cycles: u32) {
        if let Mbc::Mbc3(Mbc3 { rtc: Some(rtc), .. }) = &mut self.mbc {
            rtc.advance(cycles);
        }
    }

    pub(crate) fn ram(&self) -> &[u8] {
        &self.ram
    }
}
