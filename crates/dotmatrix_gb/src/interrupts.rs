//! Interrupt sources and the IE/IF register pair.

use serde::{Deserialize, Serialize};

/// Interrupt sources in priority order (lowest bit wins).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interrupt {
    VBlank = 0,
    LcdStat = 1,
    Timer = 2,
    Serial = 3,
    Joypad = 4,
}

impl Interrupt {
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    #[inline]
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Address the CPU jumps to when servicing this interrupt.
    #[inline]
    pub const fn vector(self) -> u16 {
        0x0040 + (self as u16) * 8
    }

    /// Highest-priority source present in a 5-bit mask.
    pub fn from_mask(mask: u8) -> Option<Interrupt> {
        let pending = mask & 0x1F;
        if pending == 0 {
            return None;
        }
        Self::ALL.get(pending.trailing_zeros() as usize).copied()
    }
}

/// Owner of the IE ($FFFF) and IF ($FF0F) registers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptController {
    enabled: u8,
    requested: u8,
}

impl InterruptController {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn request(&mut self, source: Interrupt) {
        self.requested |= source.bit();
    }

    #[inline]
    pub fn acknowledge(&mut self, source: Interrupt) {
        self.requested &= !source.bit();
    }

    #[inline]
    pub fn is_requested(&self, source: Interrupt) -> bool {
        self.requested & source.bit() != 0
    }

    /// Lowest-numbered source that is both enabled and requested.
    #[inline]
    pub fn highest_pending_enabled(&self) -> Option<Interrupt> {
        Interrupt::from_mask(self.enabled & self.requested)
    }

    /// IF as seen by the CPU: the upper three bits read back as 1.
    #[inline]
    pub fn read_if(&self) -> u8 {
        self.requested | 0xE0
    }

    #[inline]
    pub fn write_if(&mut self, value: u8) {
        self.requested = value & 0x1F;
    }

    /// IE keeps all eight bits even though only the low five dispatch.
    #[inline]
    pub fn read_ie(&self) -> u8 {
        self.enabled
    }

    #[inline]
    pub fn write_ie(&mut self, value: u8) {
        self.enabled = value;
    }
}
