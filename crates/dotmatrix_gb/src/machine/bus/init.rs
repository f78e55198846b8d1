use super::GameBoyBus;
use crate::config::RamInit;

impl GameBoyBus {
    /// Put every component into the DMG post-boot state. The cartridge
    /// keeps its RAM but its bank registers return to power-on values.
    pub(crate) fn power_on(&mut self, ram_init: RamInit) {
        self.fill_internal_ram(ram_init);

        self.cartridge.reset();
        self.interrupts = Default::default();
        // IF has the V-blank request left over from the boot ROM.
        self.interrupts.write_if(0x01);
        self.timer.init_dmg();
        self.ppu = Default::default();
        self.ppu.init_dmg();
        self.serial.init_dmg();
        self.joypad = Default::default();
        self.apu.init_dmg();
        self.dma.init_dmg();
    }

    /// WRAM and HRAM power up with noise on hardware. The pseudo-random
    /// fill is a fixed-seed xorshift32, so runs stay reproducible.
    fn fill_internal_ram(&mut self, ram_init: RamInit) {
        match ram_init {
            RamInit::Zeroed => {
                self.wram.fill(0);
                self.hram.fill(0);
            }
            RamInit::Pseudorandom { seed } => {
                // xorshift32 is stuck at zero.
                let mut x = if seed == 0 { 0xC0DE_1234 } else { seed };
                let mut next_byte = || {
                    x ^= x << 13;
                    x ^= x >> 17;
                    x ^= x << 5;
                    x as u8
                };
                for byte in self.wram.iter_mut().chain(self.hram.iter_mut()) {
                    *byte = next_byte();
                }
            }
        }
    }
}
