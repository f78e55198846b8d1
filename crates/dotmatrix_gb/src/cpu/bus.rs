use crate::interrupts::Interrupt;

/// Abstraction over the Game Boy address space as seen by the CPU.
///
/// The interrupt hooks default to IE/IF accesses through `read8`/`write8`,
/// so a flat test memory behaves like real hardware without extra work.
/// The machine bus overrides them to go straight to its interrupt
/// controller.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// Highest-priority interrupt that is both enabled and requested.
    fn pending_interrupt(&mut self) -> Option<Interrupt> {
        let ie = self.read8(0xFFFF);
        let iflags = self.read8(0xFF0F);
        Interrupt::from_mask(ie & iflags)
    }

    /// Whether `source` is requested, regardless of IE.
    fn interrupt_requested(&mut self, source: Interrupt) -> bool {
        self.read8(0xFF0F) & source.bit() != 0
    }

    /// Clear the request bit of a serviced interrupt.
    fn acknowledge_interrupt(&mut self, source: Interrupt) {
        let iflags = self.read8(0xFF0F);
        self.write8(0xFF0F, iflags & !source.bit());
    }
}
