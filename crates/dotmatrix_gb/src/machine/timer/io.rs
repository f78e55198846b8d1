use crate::interrupts::InterruptController;

use super::Timer;

impl Timer {
    pub(crate) fn read_register(&self, addr: u16) -> u8 {
        match addr {
            0xFF04 => (self.internal_counter >> 6) as u8,
            0xFF05 => self.tima,
            0xFF06 => self.tma,
            0xFF07 => self.tac | 0b1111_1000,
            _ => 0xFF,
        }
    }

    pub(crate) fn write_register(
        &mut self,
        addr: u16,
        value: u8,
        interrupts: &mut InterruptController,
    ) {
        match addr {
            0xFF04 => self.div_write(interrupts),
            0xFF05 => self.tima = value,
            0xFF06 => self.tma = value,
            0xFF07 => self.tac_write(value, interrupts),
            _ => {}
        }
    }

    /// Any write to DIV clears the whole system counter. If the selected
    /// bit was 1 this is a falling edge and TIMA ticks once.
    fn div_write(&mut self, interrupts: &mut InterruptController) {
        let before = self.timer_input();
        self.internal_counter = 0;
        if before {
            self.increment_tima(interrupts);
        }
    }

    /// Disabling the timer or switching the clock source while the timer
    /// input is high is also a falling edge.
    fn tac_write(&mut self, value: u8, interrupts: &mut InterruptController) {
        let before = self.timer_input();
        self.tac = value & 0x07;
        if before && !self.timer_input() {
            self.increment_tima(interrupts);
        }
    }
}
