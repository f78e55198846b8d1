use crate::cpu::{Bus, Cpu, Flag};

impl Cpu {
    /// Condition field (bits 3-4) of JR/JP/CALL/RET cc: NZ, Z, NC, C.
    #[inline]
    fn cc_condition(&self, opcode: u8) -> bool {
        match (opcode >> 3) & 0x03 {
            0 => !self.get_flag(Flag::Z),
            1 => self.get_flag(Flag::Z),
            2 => !self.get_flag(Flag::C),
            _ => self.get_flag(Flag::C),
        }
    }

    pub(in crate::cpu) fn exec_jr_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let taken = self.cc_condition(opcode);
        self.jr(bus, taken)
    }

    pub(in crate::cpu) fn exec_jp_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let taken = self.cc_condition(opcode);
        self.jp_cond(bus, taken)
    }

    pub(in crate::cpu) fn exec_jp_a16<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.regs.pc = self.fetch16(bus);
        16
    }

    pub(in crate::cpu) fn exec_jp_hl(&mut self) -> u32 {
        self.regs.pc = self.regs.hl();
        4
    }

    pub(in crate::cpu) fn exec_call_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let taken = self.cc_condition(opcode);
        self.call_cond(bus, taken)
    }

    pub(in crate::cpu) fn exec_ret_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let taken = self.cc_condition(opcode);
        self.ret_cond(bus, taken)
    }
}
