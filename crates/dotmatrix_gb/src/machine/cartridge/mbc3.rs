use serde::{Deserialize, Serialize};

use super::rtc::Rtc;
use super::{BankGeometry, Translation};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Mbc3 {
    ram_enabled: bool,
    rom_bank: u8,
    /// $00-$03 select a RAM bank, $08-$0C an RTC register.
    ram_rtc_select: u8,
    /// Whether the last write to the latch window was $00.
    latch_armed: bool,
    pub(super) rtc: Option<Rtc>,
}

impl Mbc3 {
    pub(super) fn new(with_rtc: bool) -> Self {
        Self {
            ram_enabled: false,
            rom_bank: 1,
            ram_rtc_select: 0,
            latch_armed: false,
            rtc: with_rtc.then(Rtc::default),
        }
    }

    pub(super) fn reset(&mut self) {
        let rtc = self.rtc.take();
        *self = Self::new(false);
        self.rtc = rtc;
    }

    pub(super) fn translate(&self, addr: u16, geometry: &BankGeometry) -> Translation {
        match addr {
            0x0000..=0x3FFF => Translation::Rom(geometry.rom_offset(0, addr)),
            0x4000..=0x7FFF => {
                Translation::Rom(geometry.rom_offset(usize::from(self.rom_bank), addr))
            }
            0xA000..=0xBFFF if self.ram_enabled => match self.ram_rtc_select {
                bank @ 0x00..=0x03 if geometry.ram_banks > 0 => {
                    Translation::Ram(geometry.ram_offset(usize::from(bank), addr))
                }
                register @ 0x08..=0x0C if self.rtc.is_some() => Translation::Rtc(register),
                _ => Translation::Unmapped,
            },
            _ => Translation::Unmapped,
        }
    }

    pub(super) fn write_control(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            0x2000..=0x3FFF => {
                self.rom_bank = match value & 0x7F {
                    0 => 1,
                    bank => bank,
                };
            }
            0x4000..=0x5FFF => self.ram_rtc_select = value,
            0x6000..=0x7FFF => {
                if self.latch_armed && value == 0x01 {
                    if let Some(rtc) = self.rtc.as_mut() {
                        rtc.latch();
                    }
                }
                self.latch_armed = value == 0x00;
            }
            _ => {}
        }
    }
}
