use serde::{Deserialize, Serialize};

use crate::error::LoadError;

const TITLE: std::ops::Range<usize> = 0x0134..0x0144;
const CARTRIDGE_TYPE: usize = 0x0147;
const ROM_SIZE: usize = 0x0148;
const RAM_SIZE: usize = 0x0149;
const HEADER_CHECKSUM: usize = 0x014D;
const GLOBAL_CHECKSUM: usize = 0x014E;
/// First byte after the header.
pub(crate) const HEADER_END: usize = 0x0150;

/// Metadata from the cartridge header at $0134-$014F.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartridgeHeader {
    pub title: String,
    pub cartridge_type: u8,
    pub rom_size_code: u8,
    pub ram_size_code: u8,
    pub header_checksum: u8,
    pub global_checksum: u16,
}

impl CartridgeHeader {
    pub fn parse(rom: &[u8]) -> Result<Self, LoadError> {
        if rom.len() < HEADER_END {
            return Err(LoadError::HeaderTooShort { len: rom.len() });
        }

        let title = rom[TITLE]
            .iter()
            .take_while(|&&b| b != 0)
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|&b| b as char)
            .collect::<String>()
            .trim_end()
            .to_string();

        Ok(Self {
            title,
            cartridge_type: rom[CARTRIDGE_TYPE],
            rom_size_code: rom[ROM_SIZE],
            ram_size_code: rom[RAM_SIZE],
            header_checksum: rom[HEADER_CHECKSUM],
            global_checksum: u16::from_be_bytes([rom[GLOBAL_CHECKSUM], rom[GLOBAL_CHECKSUM + 1]]),
        })
    }

    /// Number of 16 KiB ROM banks the header declares.
    pub fn rom_bank_count(&self) -> Result<usize, LoadError> {
        match self.rom_size_code {
            code @ 0x00..=0x08 => Ok(2usize << code),
            code => Err(LoadError::InvalidRomSize { code }),
        }
    }

    /// Number of 8 KiB RAM banks the header declares.
    pub fn ram_bank_count(&self) -> Result<usize, LoadError> {
        match self.ram_size_code {
            0x00 | 0x01 => Ok(0),
            0x02 => Ok(1),
            0x03 => Ok(4),
            0x04 => Ok(16),
            0x05 => Ok(8),
            code => Err(LoadError::InvalidRamSize { code }),
        }
    }

    /// Header checksum as the boot ROM computes it over $0134-$014C.
    pub fn compute_header_checksum(rom: &[u8]) -> u8 {
        rom.get(0x0134..HEADER_CHECKSUM)
            .unwrap_or_default()
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1))
    }

    pub fn has_battery(&self) -> bool {
        matches!(
            self.cartridge_type,
            0x03 | 0x09 | 0x0F | 0x10 | 0x13 | 0x1B | 0x1E
        )
    }
}
