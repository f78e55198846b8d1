//! Timer / divider unit.
//!
//! The 16-bit system counter ticks once per M-cycle and DIV exposes its
//! bits 13:6. TIMA counts falling edges of one counter bit selected by TAC,
//! which is why a DIV reset or a TAC change can produce an extra increment.
//! On overflow TIMA reloads from TMA and the timer interrupt is requested
//! in the same M-cycle.
mod io;


use serde::{Deserialize, Serialize};

use crate::interrupts::{Interrupt, InterruptController};

/// System counter value at $0100 on DMG, so that DIV reads 0xAB.
const DMG_POST_BOOT_COUNTER: u16 = 0x2AC0;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Timer {
    /// Hidden system counter; DIV exposes its upper bits.
    pub(crate) internal_counter: u16,
    /// TIMA (FF05).
    pub(crate) tima: u8,
    /// TMA (FF06).
    pub(crate) tma: u8,
    /// TAC, lower 3 bits.
    pub(crate) tac: u8,
    /// T-cycles received but not yet folded into a whole M-cycle.
    residual: u32,
}

impl Timer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn init_dmg(&mut self) {
        *self = Self {
            internal_counter: DMG_POST_BOOT_COUNTER,
            ..Self::default()
        };
    }

    #[inline]
    pub(crate) fn enabled(&self) -> bool {
        self.tac & 0x04 != 0
    }

    /// Counter bit feeding TIMA for the current TAC clock select:
    /// 00 -> bit 7 (1024 T), 01 -> bit 1 (16 T), 10 -> bit 3 (64 T),
    /// 11 -> bit 5 (256 T).
    #[inline]
    fn selected_bit(&self) -> u16 {
        match self.tac & 0x03 {
            0x00 => 1 << 7,
            0x01 => 1 << 1,
            0x02 => 1 << 3,
            _ => 1 << 5,
        }
    }

    /// The AND of the enable bit and the selected counter bit. TIMA
    /// increments whenever this signal falls.
    #[inline]
    pub(crate) fn timer_input(&self) -> bool {
        self.enabled() && self.internal_counter & self.selected_bit() != 0
    }

    /// Advance by `cycles` T-cycles.
    pub(crate) fn advance(&mut self, cycles: u32, interrupts: &mut InterruptController) {
        self.residual += cycles;
        while self.residual >= 4 {
            self.residual -= 4;
            self.tick_mcycle(interrupts);
        }
    }

    fn tick_mcycle(&mut self, interrupts: &mut InterruptController) {
        let before = self.timer_input();
        self.internal_counter = self.internal_counter.wrapping_add(1);
        if before && !self.timer_input() {
            self.increment_tima(interrupts);
        }
    }

    pub(crate) fn increment_tima(&mut self, interrupts: &mut InterruptController) {
        let (next, overflow) = self.tima.overflowing_add(1);
        if overflow {
            self.tima = self.tma;
            interrupts.request(Interrupt::Timer);
        } else {
            self.tima = next;
        }
    }
}
