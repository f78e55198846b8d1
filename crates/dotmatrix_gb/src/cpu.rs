//! Sharp LR35902 core.
//!
//! `Cpu::step` executes one unit of work (an instruction, an interrupt
//! entry, or an idle halt/stop cycle) against any [`Bus`] and reports the
//! T-cycles it consumed. The machine's step driver is responsible for
//! advancing the rest of the system by that amount.

mod alu;
mod bus;
mod cb;
mod exec;
mod helpers;
mod init;
mod interrupts;
mod regs;
mod step;


use serde::{Deserialize, Serialize};

pub use bus::Bus;
pub use regs::{Flag, Registers};

/// Execution state of the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    #[default]
    Running,
    /// Entered by HALT; left when any enabled interrupt is requested,
    /// whether or not IME is set.
    Halted,
    /// Entered by STOP; left when the joypad interrupt is requested.
    Stopped,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    pub regs: Registers,
    pub ime: bool,
    pub state: CpuState,
    /// Set by HALT when IME is clear and an interrupt is already pending:
    /// the next opcode fetch does not advance PC.
    halt_bug: bool,
    ime_enable_pending: bool,
    ime_enable_delay: bool,
}
