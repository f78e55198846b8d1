use crate::error::ExecutionError;
use crate::interrupts::Interrupt;

use super::exec::is_illegal_opcode;
use super::{Bus, Cpu, CpuState};

/// Cost of one idle cycle while halted or stopped.
const IDLE_CYCLES: u32 = 4;

impl Cpu {
    /// Execute one unit of work and return the T-cycles it took.
    ///
    /// A unit is an interrupt entry, one full instruction, or a single idle
    /// cycle while halted or stopped. Illegal opcodes are reported before
    /// any state changes, so PC still points at the offending byte.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, ExecutionError> {
        match self.state {
            CpuState::Running => {}
            CpuState::Halted => {
                if bus.pending_interrupt().is_none() {
                    return Ok(IDLE_CYCLES);
                }
                self.state = CpuState::Running;
            }
            CpuState::Stopped => {
                if !bus.interrupt_requested(Interrupt::Joypad) {
                    return Ok(IDLE_CYCLES);
                }
                self.state = CpuState::Running;
            }
        }

        if let Some(cycles) = self.service_interrupt(bus) {
            return Ok(cycles);
        }

        let address = self.regs.pc;
        let opcode = bus.read8(address);
        if is_illegal_opcode(opcode) {
            log::error!(
                "GB CPU locked: invalid opcode 0x{opcode:02X} at PC=0x{address:04X} (SP=0x{sp:04X} AF=0x{af:04X} BC=0x{bc:04X} DE=0x{de:04X} HL=0x{hl:04X})",
                sp = self.regs.sp,
                af = self.regs.af(),
                bc = self.regs.bc(),
                de = self.regs.de(),
                hl = self.regs.hl(),
            );
            return Err(ExecutionError::IllegalOpcode {
                opcode,
                address,
                registers: self.regs,
            });
        }

        let opcode = self.fetch8(bus);
        let cycles = self.exec_opcode(bus, opcode);
        self.apply_ime_delay();
        Ok(cycles)
    }
}
