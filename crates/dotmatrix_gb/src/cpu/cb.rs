use super::{Bus, Cpu, Flag};

impl Cpu {
    /// Execute the CB-prefixed opcode following the prefix byte.
    ///
    /// Decoding uses the x/y/z split: x selects the group, y the operation
    /// or bit number, z the operand register.
    pub(super) fn step_cb<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let cb = self.fetch8(bus);
        let x = cb >> 6;
        let y = (cb >> 3) & 0x07;
        let z = cb & 0x07;
        let on_hl = z == 6;
        let value = self.read_reg8(bus, z);

        match x {
            0 => {
                let result = self.alu_rotate_shift(y, value);
                self.write_reg8(bus, z, result);
            }
            1 => {
                // BIT only reads its operand, so (HL) costs one access less.
                let carry = self.get_flag(Flag::C);
                self.set_flags(value & (1 << y) == 0, false, true, carry);
                return if on_hl { 12 } else { 8 };
            }
            2 => self.write_reg8(bus, z, value & !(1 << y)),
            _ => self.write_reg8(bus, z, value | (1 << y)),
        }

        if on_hl {
            16
        } else {
            8
        }
    }
}
