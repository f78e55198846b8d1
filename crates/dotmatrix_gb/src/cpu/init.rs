use super::{Cpu, CpuState, Registers};

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// A CPU in the state the DMG boot ROM leaves behind at $0100.
    pub fn new() -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            ime: false,
            state: CpuState::Running,
            halt_bug: false,
            ime_enable_pending: false,
            ime_enable_delay: false,
        };
        cpu.apply_dmg_boot_state();
        cpu
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Register values after the DMG boot ROM hands control to the
    /// cartridge (Pan Docs, "Power Up Sequence").
    fn apply_dmg_boot_state(&mut self) {
        self.regs = Registers {
            a: 0x01,
            f: 0xB0,
            b: 0x00,
            c: 0x13,
            d: 0x00,
            e: 0xD8,
            h: 0x01,
            l: 0x4D,
            sp: 0xFFFE,
            pc: 0x0100,
        };
        // The cartridge is responsible for enabling interrupts.
        self.ime = false;
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.state == CpuState::Stopped
    }
}
