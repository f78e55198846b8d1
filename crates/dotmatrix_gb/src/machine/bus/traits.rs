use crate::cpu::Bus;
use crate::interrupts::Interrupt;

use super::GameBoyBus;

impl Bus for GameBoyBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.peek(addr)
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.poke(addr, value);
    }

    fn pending_interrupt(&mut self) -> Option<Interrupt> {
        self.interrupts.highest_pending_enabled()
    }

    fn interrupt_requested(&mut self, source: Interrupt) -> bool {
        self.interrupts.is_requested(source)
    }

    fn acknowledge_interrupt(&mut self, source: Interrupt) {
        self.interrupts.acknowledge(source);
    }
}
