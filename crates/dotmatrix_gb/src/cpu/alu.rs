use super::{Cpu, Flag};

impl Cpu {
    #[inline]
    pub(super) fn set_flags(&mut self, z: bool, n: bool, h: bool, c: bool) {
        self.regs.f = (u8::from(z) << Flag::Z as u8)
            | (u8::from(n) << Flag::N as u8)
            | (u8::from(h) << Flag::H as u8)
            | (u8::from(c) << Flag::C as u8);
    }

    #[inline]
    fn carry_bit(&self, use_carry: bool) -> u8 {
        u8::from(use_carry && self.get_flag(Flag::C))
    }

    /// ADD (`use_carry == false`) or ADC on A.
    pub(super) fn alu_add(&mut self, value: u8, use_carry: bool) {
        let a = self.regs.a;
        let carry_in = self.carry_bit(use_carry);
        let half = (a & 0x0F) + (value & 0x0F) + carry_in;
        let full = u16::from(a) + u16::from(value) + u16::from(carry_in);
        let result = full as u8;

        self.regs.a = result;
        self.set_flags(result == 0, false, half > 0x0F, full > 0xFF);
    }

    /// A - value (- carry), flags only. Shared by SUB, SBC and CP.
    #[inline]
    fn sub_flags(&mut self, value: u8, carry_in: u8) -> u8 {
        let a = self.regs.a;
        let half = i16::from(a & 0x0F) - i16::from(value & 0x0F) - i16::from(carry_in);
        let full = i16::from(a) - i16::from(value) - i16::from(carry_in);
        let result = full as u8;
        self.set_flags(result == 0, true, half < 0, full < 0);
        result
    }

    /// SUB (`use_carry == false`) or SBC on A.
    pub(super) fn alu_sub(&mut self, value: u8, use_carry: bool) {
        let carry_in = self.carry_bit(use_carry);
        self.regs.a = self.sub_flags(value, carry_in);
    }

    /// Compare: flags as for `A - value`, A unchanged.
    #[inline]
    pub(super) fn alu_cp(&mut self, value: u8) {
        self.sub_flags(value, 0);
    }

    #[inline]
    pub(super) fn alu_and(&mut self, value: u8) {
        self.regs.a &= value;
        self.set_flags(self.regs.a == 0, false, true, false);
    }

    #[inline]
    pub(super) fn alu_or(&mut self, value: u8) {
        self.regs.a |= value;
        self.set_flags(self.regs.a == 0, false, false, false);
    }

    #[inline]
    pub(super) fn alu_xor(&mut self, value: u8) {
        self.regs.a ^= value;
        self.set_flags(self.regs.a == 0, false, false, false);
    }

    /// Dispatch for the eight accumulator operations encoded in bits 3-5
    /// of both the 0x80-0xBF block and the `op A,d8` immediates.
    pub(super) fn alu_op(&mut self, operation: u8, value: u8) {
        match operation & 0x07 {
            0 => self.alu_add(value, false),
            1 => self.alu_add(value, true),
            2 => self.alu_sub(value, false),
            3 => self.alu_sub(value, true),
            4 => self.alu_and(value),
            5 => self.alu_xor(value),
            6 => self.alu_or(value),
            _ => self.alu_cp(value),
        }
    }

    /// Decimal adjust after a BCD addition or subtraction. N is kept.
    pub(super) fn alu_daa(&mut self) {
        let subtract = self.get_flag(Flag::N);
        let mut adjust = 0u8;
        let mut carry = self.get_flag(Flag::C);

        if self.get_flag(Flag::H) || (!subtract && (self.regs.a & 0x0F) > 0x09) {
            adjust |= 0x06;
        }
        if carry || (!subtract && self.regs.a > 0x99) {
            adjust |= 0x60;
            carry = true;
        }

        self.regs.a = if subtract {
            self.regs.a.wrapping_sub(adjust)
        } else {
            self.regs.a.wrapping_add(adjust)
        };
        self.set_flags(self.regs.a == 0, subtract, false, carry);
    }

    /// INC r / INC (HL): C is preserved.
    #[inline]
    pub(super) fn alu_inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        let carry = self.get_flag(Flag::C);
        self.set_flags(result == 0, false, value & 0x0F == 0x0F, carry);
        result
    }

    /// DEC r / DEC (HL): C is preserved.
    #[inline]
    pub(super) fn alu_dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        let carry = self.get_flag(Flag::C);
        self.set_flags(result == 0, true, value & 0x0F == 0, carry);
        result
    }

    /// ADD HL,rr: Z preserved, H from bit 11, C from bit 15.
    #[inline]
    pub(super) fn alu_add16_hl(&mut self, value: u16) {
        let hl = self.regs.hl();
        let zero = self.get_flag(Flag::Z);
        let half = (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF;
        let (result, carry) = hl.overflowing_add(value);
        self.set_flags(zero, false, half, carry);
        self.regs.set_hl(result);
    }

    /// SP plus a signed immediate, for ADD SP,r8 and LD HL,SP+r8.
    ///
    /// Z and N are cleared; H and C come from the unsigned low-byte add.
    #[inline]
    pub(super) fn alu_add16_signed(&mut self, base: u16, imm8: u8) -> u16 {
        let offset = imm8 as i8 as i16 as u16;
        let half = (base & 0x000F) + (offset & 0x000F) > 0x000F;
        let carry = (base & 0x00FF) + (offset & 0x00FF) > 0x00FF;
        self.set_flags(false, false, half, carry);
        base.wrapping_add(offset)
    }

    /// The CB-prefix rotate/shift group selected by `op` (bits 3-5 of the
    /// CB opcode): RLC, RRC, RL, RR, SLA, SRA, SWAP, SRL.
    pub(super) fn alu_rotate_shift(&mut self, op: u8, value: u8) -> u8 {
        let carry_in = self.get_flag(Flag::C);
        let (result, carry) = match op & 0x07 {
            0 => (value.rotate_left(1), value & 0x80 != 0),
            1 => (value.rotate_right(1), value & 0x01 != 0),
            2 => ((value << 1) | u8::from(carry_in), value & 0x80 != 0),
            3 => ((value >> 1) | (u8::from(carry_in) << 7), value & 0x01 != 0),
            4 => (value << 1, value & 0x80 != 0),
            5 => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            6 => (value.rotate_left(4), false),
            _ => (value >> 1, value & 0x01 != 0),
        };
        self.set_flags(result == 0, false, false, carry);
        result
    }
}
