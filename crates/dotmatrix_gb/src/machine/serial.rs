use serde::{Deserialize, Serialize};

use crate::interrupts::{Interrupt, InterruptController};

/// T-cycles for eight bits at the internal 8192 Hz serial clock.
const TRANSFER_CYCLES: u32 = 4096;

const SC_START: u8 = 0x80;
const SC_INTERNAL_CLOCK: u8 = 0x01;

/// Serial port (SB/SC) with no link partner.
///
/// An internally clocked transfer records the outgoing byte in `output`,
/// which grows until the host drains it or the machine is reset, and
/// completes 4096 T-cycles later with $FF shifted in. Externally
/// clocked transfers wait for a clock that never arrives.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct Serial {
    sb: u8,
    sc: u8,
    /// Cycles until the running transfer completes; zero when idle.
    remaining: u32,
    output: Vec<u8>,
}

impl Serial {
    pub(crate) fn init_dmg(&mut self) {
        self.sb = 0x00;
        self.sc = 0x7E;
        self.remaining = 0;
        self.output.clear();
    }

    pub(crate) fn read_sb(&self) -> u8 {
        self.sb
    }

    pub(crate) fn read_sc(&self) -> u8 {
        self.sc | 0x7E
    }

    pub(crate) fn write_sb(&mut self, value: u8) {
        self.sb = value;
    }

    pub(crate) fn write_sc(&mut self, value: u8) {
        self.sc = value;
        if value & (SC_START | SC_INTERNAL_CLOCK) == SC_START | SC_INTERNAL_CLOCK {
            log::trace!("GB serial: transfer 0x{:02X}", self.sb);
            self.output.push(self.sb);
            self.remaining = TRANSFER_CYCLES;
        } else {
            self.remaining = 0;
        }
    }

    pub(crate) fn advance(&mut self, cycles: u32, ic: &mut InterruptController) {
        if self.remaining == 0 {
            return;
        }
        if cycles < self.remaining {
            self.remaining -= cycles;
            return;
        }
        self.remaining = 0;
        self.sb = 0xFF;
        self.sc &= !SC_START;
        ic.request(Interrupt::Serial);
    }

    /// Bytes sent since power on or the last [`Serial::take_output`].
    pub(crate) fn output(&self) -> &[u8] {
        &self.output
    }

    pub(crate) fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_transfer_completes_after_4096_cycles() {
        let mut serial = Serial::default();
        let mut ic = InterruptController::new();
        serial.init_dmg();

        serial.write_sb(b'O');
        serial.write_sc(0x81);
        assert_eq!(serial.output(), b"O");
        assert_eq!(serial.read_sc(), 0xFF);

        serial.advance(4092, &mut ic);
        assert!(!ic.is_requested(Interrupt::Serial));
        assert_eq!(serial.read_sb(), b'O');

        serial.advance(4, &mut ic);
        assert!(ic.is_requested(Interrupt::Serial));
        assert_eq!(serial.read_sb(), 0xFF);
        assert_eq!(serial.read_sc(), 0x7F);
    }

    #[test]
    fn external_clock_never_completes() {
        let mut serial = Serial::default();
        let mut ic = InterruptController::new();
        serial.write_sb(0x42);
        serial.write_sc(0x80);

        serial.advance(1 << 20, &mut ic);
        assert!(serial.output().is_empty());
        assert!(!ic.is_requested(Interrupt::Serial));
        assert_eq!(serial.read_sc() & 0x80, 0x80);
    }
}
