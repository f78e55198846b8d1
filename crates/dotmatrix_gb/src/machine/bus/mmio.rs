use super::GameBoyBus;

impl GameBoyBus {
    /// CPU-visible read. Side-effect free, so the host can inspect memory
    /// without disturbing the machine.
    pub(crate) fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => self.cartridge.read(addr),
            0x8000..=0x9FFF => self.ppu.read_vram(addr),
            0xC000..=0xDFFF => self.wram[usize::from(addr - 0xC000)],
            // Echo RAM mirrors $C000-$DDFF.
            0xE000..=0xFDFF => self.wram[usize::from(addr - 0xE000)],
            0xFE00..=0xFE9F => {
                if self.dma.active() {
                    0xFF
                } else {
                    self.ppu.read_oam(addr)
                }
            }
            // Unusable region.
            0xFEA0..=0xFEFF => 0xFF,

            0xFF00 => self.joypad.read(),
            0xFF01 => self.serial.read_sb(),
            0xFF02 => self.serial.read_sc(),
            0xFF04..=0xFF07 => self.timer.read_register(addr),
            0xFF0F => self.interrupts.read_if(),
            0xFF10..=0xFF3F => self.apu.read(addr),
            0xFF46 => self.dma.register(),
            0xFF40..=0xFF4B => self.ppu.read_register(addr),
            0xFF80..=0xFFFE => self.hram[usize::from(addr - 0xFF80)],
            0xFFFF => self.interrupts.read_ie(),

            _ => 0xFF,
        }
    }

    pub(crate) fn poke(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => self.cartridge.write(addr, value),
            0x8000..=0x9FFF => self.ppu.write_vram(addr, value),
            0xC000..=0xDFFF => self.wram[usize::from(addr - 0xC000)] = value,
            0xE000..=0xFDFF => self.wram[usize::from(addr - 0xE000)] = value,
            0xFE00..=0xFE9F => {
                if !self.dma.active() {
                    self.ppu.write_oam(addr, value);
                }
            }
            0xFEA0..=0xFEFF => {}

            0xFF00 => self.joypad.write(value, &mut self.interrupts),
            0xFF01 => self.serial.write_sb(value),
            0xFF02 => self.serial.write_sc(value),
            0xFF04..=0xFF07 => self
                .timer
                .write_register(addr, value, &mut self.interrupts),
            0xFF0F => self.interrupts.write_if(value),
            0xFF10..=0xFF3F => self.apu.write(addr, value),
            0xFF46 => self.start_oam_dma(value),
            0xFF40..=0xFF4B => self
                .ppu
                .write_register(addr, value, &mut self.interrupts),
            0xFF80..=0xFFFE => self.hram[usize::from(addr - 0xFF80)] = value,
            0xFFFF => self.interrupts.write_ie(value),

            _ => {}
        }
    }
}
