use bitflags::bitflags;

use super::{Ppu, PpuMode};
use crate::interrupts::InterruptController;

bitflags! {
    /// LCDC ($FF40).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct Lcdc: u8 {
        const BG_WINDOW_ENABLE = 0x01;
        const OBJ_ENABLE = 0x02;
        const OBJ_TALL = 0x04;
        const BG_TILE_MAP = 0x08;
        const TILE_DATA_UNSIGNED = 0x10;
        const WINDOW_ENABLE = 0x20;
        const WINDOW_TILE_MAP = 0x40;
        const LCD_ENABLE = 0x80;
    }
}

bitflags! {
    /// Writable interrupt-source selects in STAT ($FF41) bits 3-6.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct StatEnable: u8 {
        const HBLANK = 0x08;
        const VBLANK = 0x10;
        const OAM = 0x20;
        const LYC = 0x40;
    }
}

const STAT_COINCIDENCE: u8 = 0x04;

impl Ppu {
    #[inline]
    pub(crate) fn lcdc(&self) -> Lcdc {
        Lcdc::from_bits_retain(self.lcdc)
    }

    #[inline]
    pub(super) fn stat_enable(&self) -> StatEnable {
        StatEnable::from_bits_truncate(self.stat_enable)
    }

    pub(crate) fn read_register(&self, addr: u16) -> u8 {
        match addr {
            0xFF40 => self.lcdc,
            0xFF41 => {
                let coincidence = if self.ly == self.lyc {
                    STAT_COINCIDENCE
                } else {
                    0
                };
                0x80 | self.stat_enable | coincidence | self.mode as u8
            }
            0xFF42 => self.scy,
            0xFF43 => self.scx,
            0xFF44 => self.ly,
            0xFF45 => self.lyc,
            0xFF47 => self.bgp,
            0xFF48 => self.obp0,
            0xFF49 => self.obp1,
            0xFF4A => self.wy,
            0xFF4B => self.wx,
            _ => 0xFF,
        }
    }

    pub(crate) fn write_register(&mut self, addr: u16, value: u8, ic: &mut InterruptController) {
        match addr {
            0xFF40 => self.write_lcdc(value),
            0xFF41 => self.stat_enable = value & StatEnable::all().bits(),
            0xFF42 => self.scy = value,
            0xFF43 => self.scx = value,
            // LY is read-only.
            0xFF44 => return,
            0xFF45 => self.lyc = value,
            0xFF47 => self.bgp = value,
            0xFF48 => self.obp0 = value,
            0xFF49 => self.obp1 = value,
            0xFF4A => self.wy = value,
            0xFF4B => self.wx = value,
            _ => return,
        }
        // Enable and LYC changes can raise the STAT line immediately.
        self.update_stat_line(ic);
    }

    fn write_lcdc(&mut self, value: u8) {
        let was_on = self.lcdc().contains(Lcdc::LCD_ENABLE);
        self.lcdc = value;
        let now_on = self.lcdc().contains(Lcdc::LCD_ENABLE);

        match (was_on, now_on) {
            (true, false) => {
                log::debug!("GB PPU: LCD off at LY={} dot={}", self.ly, self.dot);
                self.ly = 0;
                self.dot = 0;
                self.mode = PpuMode::HBlank;
                self.window_line = 0;
                self.window_triggered = false;
                self.stat_line = false;
                self.line_sprites.clear();
                self.front.clear();
                self.back.clear();
            }
            (false, true) => {
                log::debug!("GB PPU: LCD on");
                self.ly = 0;
                self.dot = 0;
                self.start_line();
            }
            _ => {}
        }
    }
}
