use serde::{Deserialize, Serialize};

/// T-cycles per RTC second at the DMG clock rate.
const CYCLES_PER_SECOND: u32 = 4_194_304;

const DAY_HIGH_MSB: u8 = 0x01;
const DAY_HIGH_HALT: u8 = 0x40;
const DAY_HIGH_CARRY: u8 = 0x80;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct RtcRegisters {
    seconds: u8,
    minutes: u8,
    hours: u8,
    day_low: u8,
    day_high: u8,
}

/// MBC3 real-time clock.
///
/// Time is driven by emulated cycles rather than the host clock, so two
/// sessions fed the same inputs see the same clock values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Rtc {
    live: RtcRegisters,
    latched: RtcRegisters,
    subsecond_cycles: u32,
}

impl Rtc {
    pub(crate) fn advance(&mut self, cycles: u32) {
        if self.live.day_high & DAY_HIGH_HALT != 0 {
            return;
        }
        self.subsecond_cycles += cycles;
        while self.subsecond_cycles >= CYCLES_PER_SECOND {
            self.subsecond_cycles -= CYCLES_PER_SECOND;
            self.tick_second();
        }
    }

    fn tick_second(&mut self) {
        let regs = &mut self.live;
        // Out-of-range values keep counting up to the register width before
        // wrapping, without carrying into the next field.
        regs.seconds = (regs.seconds + 1) & 0x3F;
        if regs.seconds != 60 {
            return;
        }
        regs.seconds = 0;

        regs.minutes = (regs.minutes + 1) & 0x3F;
        if regs.minutes != 60 {
            return;
        }
        regs.minutes = 0;

        regs.hours = (regs.hours + 1) & 0x1F;
        if regs.hours != 24 {
            return;
        }
        regs.hours = 0;

        let day = ((u16::from(regs.day_high & DAY_HIGH_MSB) << 8) | u16::from(regs.day_low)) + 1;
        regs.day_low = day as u8;
        regs.day_high = (regs.day_high & !DAY_HIGH_MSB) | ((day >> 8) as u8 & DAY_HIGH_MSB);
        if day > 0x1FF {
            regs.day_low = 0;
            regs.day_high = (regs.day_high & !DAY_HIGH_MSB) | DAY_HIGH_CARRY;
        }
    }

    /// Copy the running counters into the registers the CPU reads.
    pub(crate) fn latch(&mut self) {
        self.latched = self.live;
    }

    /// Read a latched register selected by $08-$0C.
    pub(crate) fn read(&self, select: u8) -> u8 {
        let regs = &self.latched;
        match select {
            0x08 => regs.seconds,
            0x09 => regs.minutes,
            0x0A => regs.hours,
            0x0B => regs.day_low,
            0x0C => regs.day_high | 0x3E,
            _ => 0xFF,
        }
    }

    pub(crate) fn write(&mut self, select: u8, value: u8) {
        let regs = &mut self.live;
        match select {
            0x08 => {
                regs.seconds = value & 0x3F;
                self.subsecond_cycles = 0;
            }
            0x09 => regs.minutes = value & 0x3F,
            0x0A => regs.hours = value & 0x1F,
            0x0B => regs.day_low = value,
            0x0C => regs.day_high = value & (DAY_HIGH_MSB | DAY_HIGH_HALT | DAY_HIGH_CARRY),
            _ => return,
        }
        self.latched = self.live;
    }
}
