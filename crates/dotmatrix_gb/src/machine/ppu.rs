use serde::{Deserialize, Serialize};

use crate::interrupts::{Interrupt, InterruptController};

mod access;
mod framebuffer;
mod oam;
mod registers;
mod render;


pub use framebuffer::Framebuffer;

use oam::Sprite;
use registers::{Lcdc, StatEnable};

pub(crate) const DOTS_PER_LINE: u16 = 456;
const OAM_SCAN_END: u16 = 80;
const FIRST_PIXEL_DOT: u16 = 92;
const LAST_PIXEL_DOT: u16 = 251;
const TRANSFER_END: u16 = 252;

pub(crate) const VBLANK_START_LINE: u8 = 144;
const LINES_PER_FRAME: u8 = 154;

const VRAM_SIZE: usize = 0x2000;
const OAM_SIZE: usize = 0xA0;

/// PPU mode as reported in STAT bits 0-1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PpuMode {
    #[default]
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Transfer = 3,
}

/// Dot-driven DMG PPU.
///
/// Owns VRAM, OAM and the LCD registers. Each dot advances the line state
/// machine; during pixel transfer one pixel is composed per dot into the
/// back buffer, which is published as the front buffer on V-blank entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Ppu {
    vram: Vec<u8>,
    oam: Vec<u8>,

    lcdc: u8,
    /// STAT bits 3-6; the low bits are derived on read.
    stat_enable: u8,
    scy: u8,
    scx: u8,
    ly: u8,
    lyc: u8,
    bgp: u8,
    obp0: u8,
    obp1: u8,
    wy: u8,
    wx: u8,

    mode: PpuMode,
    /// Dot within the current line, 0..456.
    dot: u16,
    /// Internal window row counter; only advances on lines that drew the
    /// window.
    window_line: u8,
    /// WY matched LY at some line start this frame.
    window_triggered: bool,
    window_drawn: bool,
    line_sprites: Vec<Sprite>,
    /// OR of the enabled STAT sources after the last dot, for edge detection.
    stat_line: bool,

    back: Framebuffer,
    front: Framebuffer,
    frame_count: u64,
    frame_ready: bool,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    /// A PPU with the LCD off and all memory cleared.
    pub(crate) fn new() -> Self {
        Self {
            vram: vec![0; VRAM_SIZE],
            oam: vec![0; OAM_SIZE],
            lcdc: 0,
            stat_enable: 0,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0,
            obp0: 0,
            obp1: 0,
            wy: 0,
            wx: 0,
            mode: PpuMode::HBlank,
            dot: 0,
            window_line: 0,
            window_triggered: false,
            window_drawn: false,
            line_sprites: Vec::with_capacity(oam::MAX_SPRITES_PER_LINE),
            stat_line: false,
            back: Framebuffer::default(),
            front: Framebuffer::default(),
            frame_count: 0,
            frame_ready: false,
        }
    }

    /// Register values left behind by the DMG boot ROM: LCD on, BG on,
    /// $8000 tile data, BGP=$FC, starting at line 0.
    pub(crate) fn init_dmg(&mut self) {
        self.lcdc = 0x91;
        self.bgp = 0xFC;
        self.ly = 0;
        self.dot = 0;
        self.start_line();
    }

    #[cfg(test)]
    pub(crate) fn mode(&self) -> PpuMode {
        self.mode
    }

    #[cfg(test)]
    pub(crate) fn ly(&self) -> u8 {
        self.ly
    }

    pub(crate) fn lcd_enabled(&self) -> bool {
        self.lcdc().contains(Lcdc::LCD_ENABLE)
    }

    pub(crate) fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Most recently published frame.
    pub(crate) fn framebuffer(&self) -> &Framebuffer {
        &self.front
    }

    /// Whether a frame was published since the last call.
    pub(crate) fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    pub(crate) fn advance(&mut self, cycles: u32, ic: &mut InterruptController) {
        if !self.lcd_enabled() {
            return;
        }
        for _ in 0..cycles {
            self.tick_dot(ic);
        }
    }

    fn tick_dot(&mut self, ic: &mut InterruptController) {
        if self.ly < VBLANK_START_LINE {
            match self.dot {
                OAM_SCAN_END => {
                    self.scan_oam();
                    self.mode = PpuMode::Transfer;
                }
                FIRST_PIXEL_DOT..=LAST_PIXEL_DOT => {
                    self.render_pixel((self.dot - FIRST_PIXEL_DOT) as u8);
                }
                TRANSFER_END => self.mode = PpuMode::HBlank,
                _ => {}
            }
        }

        self.dot += 1;
        if self.dot == DOTS_PER_LINE {
            self.dot = 0;
            self.next_line(ic);
        }
        self.update_stat_line(ic);
    }

    fn next_line(&mut self, ic: &mut InterruptController) {
        if std::mem::take(&mut self.window_drawn) {
            self.window_line = self.window_line.wrapping_add(1);
        }

        self.ly += 1;
        if self.ly == VBLANK_START_LINE {
            self.enter_vblank(ic);
        } else if self.ly == LINES_PER_FRAME {
            self.ly = 0;
            self.window_line = 0;
            self.window_triggered = false;
            self.start_line();
        } else if self.ly < VBLANK_START_LINE {
            self.start_line();
        }
    }

    fn start_line(&mut self) {
        if self.ly == self.wy {
            self.window_triggered = true;
        }
        self.mode = PpuMode::OamScan;
    }

    fn enter_vblank(&mut self, ic: &mut InterruptController) {
        self.mode = PpuMode::VBlank;
        ic.request(Interrupt::VBlank);

        // Every visible pixel is rewritten each frame, so the old front
        // buffer can serve as the next back buffer.
        std::mem::swap(&mut self.front, &mut self.back);
        self.frame_count += 1;
        self.frame_ready = true;
    }

    /// Recompute the STAT interrupt line and request LcdStat on a rising
    /// edge.
    pub(super) fn update_stat_line(&mut self, ic: &mut InterruptController) {
        if !self.lcd_enabled() {
            self.stat_line = false;
            return;
        }

        let enable = self.stat_enable();
        // The OAM source is also live for the first dot of V-blank.
        let vblank_entry = self.ly == VBLANK_START_LINE && self.dot == 0;
        let line = (enable.contains(StatEnable::HBLANK) && self.mode == PpuMode::HBlank)
            || (enable.contains(StatEnable::VBLANK) && self.mode == PpuMode::VBlank)
            || (enable.contains(StatEnable::OAM)
                && (self.mode == PpuMode::OamScan || vblank_entry))
            || (enable.contains(StatEnable::LYC) && self.ly == self.lyc);

        if line && !self.stat_line {
            ic.request(Interrupt::LcdStat);
        }
        self.stat_line = line;
    }
}
