use super::registers::Lcdc;
use super::{Ppu, PpuMode};

impl Ppu {
    /// VRAM is closed to the CPU during pixel transfer. With the LCD off it
    /// is always open.
    pub(crate) fn vram_accessible(&self) -> bool {
        !self.lcdc().contains(Lcdc::LCD_ENABLE) || self.mode != PpuMode::Transfer
    }

    /// OAM is closed to the CPU during OAM scan and pixel transfer.
    pub(crate) fn oam_accessible(&self) -> bool {
        !self.lcdc().contains(Lcdc::LCD_ENABLE)
            || matches!(self.mode, PpuMode::HBlank | PpuMode::VBlank)
    }

    pub(crate) fn read_vram(&self, addr: u16) -> u8 {
        if self.vram_accessible() {
            self.vram_byte(addr)
        } else {
            0xFF
        }
    }

    /// VRAM byte regardless of mode, for OAM DMA.
    pub(crate) fn vram_byte(&self, addr: u16) -> u8 {
        self.vram[usize::from(addr & 0x1FFF)]
    }

    pub(crate) fn write_vram(&mut self, addr: u16, value: u8) {
        if self.vram_accessible() {
            self.vram[usize::from(addr & 0x1FFF)] = value;
        }
    }

    pub(crate) fn read_oam(&self, addr: u16) -> u8 {
        if self.oam_accessible() {
            self.oam_byte(addr)
        } else {
            0xFF
        }
    }

    pub(crate) fn write_oam(&mut self, addr: u16, value: u8) {
        if self.oam_accessible() {
            self.write_oam_direct(addr, value);
        }
    }

    #[inline]
    fn oam_byte(&self, addr: u16) -> u8 {
        self.oam
            .get(usize::from(addr.wrapping_sub(0xFE00)))
            .copied()
            .unwrap_or(0xFF)
    }

    /// OAM write that ignores mode blocking. Used by OAM DMA.
    pub(crate) fn write_oam_direct(&mut self, addr: u16, value: u8) {
        if let Some(slot) = self.oam.get_mut(usize::from(addr.wrapping_sub(0xFE00))) {
            *slot = value;
        }
    }
}
