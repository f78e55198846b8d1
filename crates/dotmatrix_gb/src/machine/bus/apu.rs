use serde::{Deserialize, Serialize};

const NR52: u16 = 0xFF26;
const WAVE_RAM_START: u16 = 0xFF30;

/// Frame sequencer period: 512 Hz in T-cycles.
const FRAME_SEQUENCER_CYCLES: u32 = 8192;

/// Bits that always read back as 1, for $FF10-$FF2F.
const READ_MASKS: [u8; 0x20] = [
    0x80, 0x3F, 0x00, 0xFF, 0xBF, // NR10-NR14
    0xFF, 0x3F, 0x00, 0xFF, 0xBF, // unused, NR21-NR24
    0x7F, 0xFF, 0x9F, 0xFF, 0xBF, // NR30-NR34
    0xFF, 0xFF, 0x00, 0x00, 0xBF, // unused, NR41-NR44
    0x00, 0x00, 0x70, // NR50-NR52
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // unused
];

/// Register addresses per channel: length (NRx1), envelope or DAC
/// (NRx2, NR30 for the wave channel) and control (NRx4).
const CHANNELS: [(u16, u16, u16); 4] = [
    (0xFF11, 0xFF12, 0xFF14),
    (0xFF16, 0xFF17, 0xFF19),
    (0xFF1B, 0xFF1A, 0xFF1E),
    (0xFF20, 0xFF21, 0xFF23),
];

/// Sound register file.
///
/// Keeps what software can observe without producing samples: read masks,
/// NR52 power gating, channel-active bits, and the length counters that
/// switch channels off.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Apu {
    /// Raw values for $FF10-$FF3F.
    regs: Vec<u8>,
    powered: bool,
    /// NR52 bits 0-3.
    active: u8,
    lengths: [u16; 4],
    sequencer_cycles: u32,
    sequencer_step: u8,
}

impl Default for Apu {
    fn default() -> Self {
        Self {
            regs: vec![0; 0x30],
            powered: false,
            active: 0,
            lengths: [0; 4],
            sequencer_cycles: 0,
            sequencer_step: 0,
        }
    }
}

impl Apu {
    /// Register values the boot ROM leaves behind (after its start-up
    /// chime on channel 1).
    pub(crate) fn init_dmg(&mut self) {
        *self = Self::default();
        self.powered = true;
        self.active = 0x01;
        for (addr, value) in [
            (0xFF10, 0x80),
            (0xFF11, 0xBF),
            (0xFF12, 0xF3),
            (0xFF13, 0xFF),
            (0xFF14, 0xBF),
            (0xFF16, 0x3F),
            (0xFF18, 0xFF),
            (0xFF19, 0xBF),
            (0xFF1A, 0x7F),
            (0xFF1B, 0xFF),
            (0xFF1C, 0x9F),
            (0xFF1D, 0xFF),
            (0xFF1E, 0xBF),
            (0xFF20, 0xFF),
            (0xFF23, 0xBF),
            (0xFF24, 0x77),
            (0xFF25, 0xF3),
        ] {
            self.regs[Self::index(addr)] = value;
        }
    }

    #[inline]
    fn index(addr: u16) -> usize {
        usize::from(addr - 0xFF10)
    }

    #[inline]
    fn max_length(channel: usize) -> u16 {
        if channel == 2 {
            256
        } else {
            64
        }
    }

    pub(crate) fn read(&self, addr: u16) -> u8 {
        match addr {
            NR52 => 0x70 | (u8::from(self.powered) << 7) | self.active,
            WAVE_RAM_START..=0xFF3F => self.regs[Self::index(addr)],
            0xFF10..=0xFF2F => self.regs[Self::index(addr)] | READ_MASKS[Self::index(addr)],
            _ => 0xFF,
        }
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            NR52 => self.write_power(value & 0x80 != 0),
            WAVE_RAM_START..=0xFF3F => self.regs[Self::index(addr)] = value,
            0xFF10..=0xFF25 if self.powered => {
                self.regs[Self::index(addr)] = value;
                self.on_register_write(addr, value);
            }
            _ => {}
        }
    }

    fn write_power(&mut self, on: bool) {
        if self.powered && !on {
            log::debug!("GB APU: power off");
            for reg in &mut self.regs[..Self::index(WAVE_RAM_START)] {
                *reg = 0;
            }
            self.active = 0;
        } else if !self.powered && on {
            log::debug!("GB APU: power on");
            self.sequencer_cycles = 0;
            self.sequencer_step = 0;
        }
        self.powered = on;
    }

    fn on_register_write(&mut self, addr: u16, value: u8) {
        for (channel, &(length_reg, dac_reg, control_reg)) in CHANNELS.iter().enumerate() {
            if addr == length_reg {
                let load = if channel == 2 {
                    u16::from(value)
                } else {
                    u16::from(value & 0x3F)
                };
                self.lengths[channel] = Self::max_length(channel) - load;
            } else if addr == dac_reg && !self.dac_enabled(channel) {
                self.active &= !(1 << channel);
            } else if addr == control_reg && value & 0x80 != 0 {
                self.trigger(channel);
            }
        }
    }

    fn dac_enabled(&self, channel: usize) -> bool {
        let (_, dac_reg, _) = CHANNELS[channel];
        let value = self.regs[Self::index(dac_reg)];
        if channel == 2 {
            value & 0x80 != 0
        } else {
            value & 0xF8 != 0
        }
    }

    fn trigger(&mut self, channel: usize) {
        if self.lengths[channel] == 0 {
            self.lengths[channel] = Self::max_length(channel);
        }
        if self.dac_enabled(channel) {
            self.active |= 1 << channel;
        }
    }

    fn length_enabled(&self, channel: usize) -> bool {
        let (_, _, control_reg) = CHANNELS[channel];
        self.regs[Self::index(control_reg)] & 0x40 != 0
    }

    pub(crate) fn advance(&mut self, cycles: u32) {
        if !self.powered {
            return;
        }
        self.sequencer_cycles += cycles;
        while self.sequencer_cycles >= FRAME_SEQUENCER_CYCLES {
            self.sequencer_cycles -= FRAME_SEQUENCER_CYCLES;
            if self.sequencer_step % 2 == 0 {
                self.clock_lengths();
            }
            self.sequencer_step = (self.sequencer_step + 1) % 8;
        }
    }

    fn clock_lengths(&mut self) {
        for channel in 0..4 {
            if !self.length_enabled(channel) || self.lengths[channel] == 0 {
                continue;
            }
            self.lengths[channel] -= 1;
            if self.lengths[channel] == 0 {
                self.active &= !(1 << channel);
            }
        }
    }
}
