use thiserror::Error;

use crate::cpu::Registers;

/// Reasons a cartridge image is rejected before a session starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("ROM image is {len} bytes; the cartridge header ends at 0x150")]
    HeaderTooShort { len: usize },
    #[error("unsupported cartridge type: 0x{code:02X}")]
    UnsupportedCartridgeType { code: u8 },
    #[error("invalid ROM size code in header: 0x{code:02X}")]
    InvalidRomSize { code: u8 },
    #[error("invalid RAM size code in header: 0x{code:02X}")]
    InvalidRamSize { code: u8 },
    #[error("ROM image is {actual} bytes but the header declares {expected}")]
    Truncated { expected: usize, actual: usize },
}

/// Conditions that end an emulation session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error(
        "illegal opcode 0x{opcode:02X} at 0x{address:04X} \
         (AF={:04X} BC={:04X} DE={:04X} HL={:04X} SP={:04X})",
        .registers.af(),
        .registers.bc(),
        .registers.de(),
        .registers.hl(),
        .registers.sp
    )]
    IllegalOpcode {
        opcode: u8,
        address: u16,
        registers: Registers,
    },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot does not start with the expected magic bytes")]
    BadMagic,
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("snapshot was taken with a different cartridge (\"{snapshot}\" vs \"{loaded}\")")]
    CartridgeMismatch { snapshot: String, loaded: String },
    #[error("snapshot encoding failed: {0}")]
    Codec(#[from] bincode::Error),
}
