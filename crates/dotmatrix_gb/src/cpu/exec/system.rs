use crate::cpu::{Bus, Cpu, CpuState};

impl Cpu {
    /// STOP is two bytes long; the second byte is ignored.
    pub(in crate::cpu) fn exec_stop<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let _padding = self.fetch8(bus);
        self.state = CpuState::Stopped;
        4
    }

    pub(in crate::cpu) fn exec_di(&mut self) -> u32 {
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        4
    }

    /// IME becomes 1 only after the instruction following EI completes.
    pub(in crate::cpu) fn exec_ei(&mut self) -> u32 {
        if !self.ime {
            self.ime_enable_pending = true;
        }
        4
    }
}
