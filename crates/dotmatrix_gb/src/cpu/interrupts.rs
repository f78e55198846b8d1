use super::{Bus, Cpu};

/// Cost of the interrupt entry sequence: two wait states, two pushes and
/// the jump.
pub(super) const INTERRUPT_ENTRY_CYCLES: u32 = 20;

impl Cpu {
    /// Enter the handler of the highest-priority pending interrupt if IME
    /// allows it. Returns the cycles spent, or `None` if nothing was taken.
    pub(super) fn service_interrupt<B: Bus>(&mut self, bus: &mut B) -> Option<u32> {
        if !self.ime {
            return None;
        }
        let source = bus.pending_interrupt()?;

        self.ime = false;
        // A bugged HALT (EI; HALT with a request already pending) returns to
        // the HALT itself rather than repeating the handler's first byte.
        let pc = if std::mem::take(&mut self.halt_bug) {
            self.regs.pc.wrapping_sub(1)
        } else {
            self.regs.pc
        };
        self.push_u16(bus, pc);
        bus.acknowledge_interrupt(source);
        self.regs.pc = source.vector();

        log::debug!(
            "GB CPU interrupt: {:?} vector=0x{:04X} from pc=0x{:04X} sp=0x{:04X}",
            source,
            self.regs.pc,
            pc,
            self.regs.sp,
        );
        Some(INTERRUPT_ENTRY_CYCLES)
    }

    /// Advance the delayed IME enable requested by EI.
    #[inline]
    pub(super) fn apply_ime_delay(&mut self) {
        if self.ime_enable_delay {
            self.ime = true;
            self.ime_enable_delay = false;
        } else if self.ime_enable_pending {
            self.ime_enable_pending = false;
            self.ime_enable_delay = true;
        }
    }
}
