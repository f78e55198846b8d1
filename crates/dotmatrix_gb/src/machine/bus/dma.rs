use serde::{Deserialize, Serialize};

use super::GameBoyBus;

const OAM_DMA_LENGTH: u8 = 0xA0;

/// OAM DMA state: copies $XX00-$XX9F into OAM, one byte per M-cycle.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct OamDma {
    register: u8,
    active: bool,
    next: u8,
    residual: u32,
}

impl OamDma {
    pub(crate) fn init_dmg(&mut self) {
        *self = Self {
            register: 0xFF,
            ..Self::default()
        };
    }

    pub(crate) fn register(&self) -> u8 {
        self.register
    }

    pub(crate) fn active(&self) -> bool {
        self.active
    }

    fn start(&mut self, value: u8) {
        self.register = value;
        self.active = true;
        self.next = 0;
        self.residual = 0;
    }
}

impl GameBoyBus {
    pub(super) fn start_oam_dma(&mut self, value: u8) {
        log::trace!("GB DMA: OAM transfer from 0x{:02X}00", value);
        self.dma.start(value);
    }

    /// Copy one OAM byte per elapsed M-cycle.
    pub(super) fn advance_dma(&mut self, cycles: u32) {
        if !self.dma.active {
            return;
        }
        self.dma.residual += cycles;
        while self.dma.active && self.dma.residual >= 4 {
            self.dma.residual -= 4;

            let offset = u16::from(self.dma.next);
            let source = (u16::from(self.dma.register) << 8) | offset;
            let byte = self.dma_source_read(source);
            self.ppu.write_oam_direct(0xFE00 | offset, byte);

            self.dma.next += 1;
            if self.dma.next == OAM_DMA_LENGTH {
                self.dma.active = false;
                self.dma.residual = 0;
            }
        }
    }

    /// DMA reads bypass PPU mode blocking. Sources at $E000 and above
    /// land in work RAM.
    fn dma_source_read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => self.cartridge.read(addr),
            0x8000..=0x9FFF => self.ppu.vram_byte(addr),
            _ => self.wram[usize::from(addr & 0x1FFF)],
        }
    }
}
