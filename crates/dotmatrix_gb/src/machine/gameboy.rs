use dotmatrix_common::key::Key;

use super::bus::{Button, GameBoyBus};
use super::cartridge::{Cartridge, CartridgeHeader};
use super::ppu::Framebuffer;
use crate::config::EmulatorConfig;
use crate::cpu::{Bus, Cpu, Registers};
use crate::error::{ExecutionError, LoadError};
use crate::CYCLES_PER_FRAME;

/// A DMG session: CPU, bus and the master clock.
///
/// Built from a validated cartridge image by [`GameBoy::load`]. Every call
/// to [`GameBoy::step`] runs the CPU for one unit of work and then advances
/// all other components by exactly the cycles it reported.
pub struct GameBoy {
    pub(super) cpu: Cpu,
    pub(super) bus: GameBoyBus,
    /// T-cycles since power on.
    pub(super) cycles: u64,
    /// Set once the CPU reports a fatal error; cleared by reset or restore.
    pub(super) fault: Option<ExecutionError>,
    config: EmulatorConfig,
}

impl GameBoy {
    pub fn load(rom: &[u8], config: EmulatorConfig) -> Result<Self, LoadError> {
        let cartridge = Cartridge::from_rom(rom)?;
        let bus = GameBoyBus::new(cartridge, config.ram_init);
        Ok(Self {
            cpu: Cpu::new(),
            bus,
            cycles: 0,
            fault: None,
            config,
        })
    }

    /// Power cycle. Cartridge RAM survives; everything else returns to the
    /// post-boot state.
    pub fn reset(&mut self) {
        log::info!("GB: reset \"{}\"", self.bus.cartridge.header().title);
        self.cpu.reset();
        self.bus.power_on(self.config.ram_init);
        self.cycles = 0;
        self.fault = None;
    }

    /// Run one CPU unit of work and advance the rest of the machine in
    /// lockstep. Returns the T-cycles consumed.
    pub fn step(&mut self) -> Result<u32, ExecutionError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }

        match self.cpu.step(&mut self.bus) {
            Ok(cycles) => {
                self.bus.advance(cycles);
                self.cycles += u64::from(cycles);
                Ok(cycles)
            }
            Err(err) => {
                self.fault = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Step until the PPU publishes a frame, or for one frame's worth of
    /// cycles while the LCD is off. Returns the T-cycles consumed.
    pub fn run_until_next_frame(&mut self) -> Result<u32, ExecutionError> {
        self.bus.ppu.take_frame_ready();
        let mut elapsed = 0u32;
        loop {
            elapsed += self.step()?;
            if self.bus.ppu.take_frame_ready() {
                return Ok(elapsed);
            }
            if !self.bus.ppu.lcd_enabled() && elapsed >= CYCLES_PER_FRAME {
                return Ok(elapsed);
            }
        }
    }

    /// The last published frame.
    pub fn framebuffer(&self) -> &Framebuffer {
        self.bus.ppu.framebuffer()
    }

    /// The last published frame as packed RGB through the configured
    /// palette.
    pub fn frame_rgb(&self, out: &mut [u8]) {
        self.framebuffer().to_rgb(&self.config.palette, out);
    }

    pub fn frame_count(&self) -> u64 {
        self.bus.ppu.frame_count()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn registers(&self) -> Registers {
        self.cpu.regs
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn header(&self) -> &CartridgeHeader {
        self.bus.cartridge.header()
    }

    pub fn fault(&self) -> Option<&ExecutionError> {
        self.fault.as_ref()
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn press(&mut self, button: Button) {
        self.bus.set_button(button, true);
    }

    pub fn release(&mut self, button: Button) {
        self.bus.set_button(button, false);
    }

    /// Forward a host key event using the default key layout.
    pub fn handle_key(&mut self, key: Key, pressed: bool) {
        if let Some(button) = Button::from_key(key) {
            self.bus.set_button(button, pressed);
        }
    }

    /// Bytes the game has sent over the serial port.
    pub fn serial_output(&self) -> &[u8] {
        self.bus.serial.output()
    }

    /// Drain the serial capture buffer.
    pub fn take_serial_output(&mut self) -> Vec<u8> {
        self.bus.serial.take_output()
    }

    /// Read an address the way the CPU would see it right now, without
    /// side effects.
    pub fn read_memory(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    /// Write an address through the normal CPU path.
    pub fn write_memory(&mut self, addr: u16, value: u8) {
        self.bus.write8(addr, value);
    }

    /// Cartridge RAM contents, for battery saves.
    pub fn cartridge_ram(&self) -> &[u8] {
        self.bus.cartridge.ram()
    }
}
