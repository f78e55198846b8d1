use dotmatrix_common::key::Key;
use serde::{Deserialize, Serialize};

use crate::interrupts::{Interrupt, InterruptController};

/// The eight DMG buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    /// Whether the button sits on the d-pad line (P14) rather than the
    /// action line (P15), and its bit within that line.
    fn line_bit(self) -> (bool, u8) {
        match self {
            Button::Right => (true, 0),
            Button::Left => (true, 1),
            Button::Up => (true, 2),
            Button::Down => (true, 3),
            Button::A => (false, 0),
            Button::B => (false, 1),
            Button::Select => (false, 2),
            Button::Start => (false, 3),
        }
    }

    /// Default keyboard layout: arrows for the d-pad, Z/X for A/B,
    /// Backspace or A for Select and Enter or S for Start.
    pub fn from_key(key: Key) -> Option<Button> {
        match key {
            Key::Right => Some(Button::Right),
            Key::Left => Some(Button::Left),
            Key::Up => Some(Button::Up),
            Key::Down => Some(Button::Down),
            Key::Z => Some(Button::A),
            Key::X => Some(Button::B),
            Key::A | Key::Backspace => Some(Button::Select),
            Key::S | Key::Enter => Some(Button::Start),
            Key::None => None,
        }
    }
}

const SELECT_DPAD: u8 = 0x10;
const SELECT_ACTION: u8 = 0x20;

/// P1/JOYP ($FF00).
///
/// Pressed masks use 1 for "held"; the register inverts them since the
/// hardware lines are active low.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Joypad {
    select: u8,
    dpad: u8,
    action: u8,
}

impl Default for Joypad {
    fn default() -> Self {
        Self {
            select: SELECT_DPAD | SELECT_ACTION,
            dpad: 0,
            action: 0,
        }
    }
}

impl Joypad {
    fn low_nibble(&self) -> u8 {
        let mut held = 0;
        if self.select & SELECT_DPAD == 0 {
            held |= self.dpad;
        }
        if self.select & SELECT_ACTION == 0 {
            held |= self.action;
        }
        !held & 0x0F
    }

    pub(crate) fn read(&self) -> u8 {
        0xC0 | self.select | self.low_nibble()
    }

    pub(crate) fn write(&mut self, value: u8, ic: &mut InterruptController) {
        self.update(ic, |pad| pad.select = value & (SELECT_DPAD | SELECT_ACTION));
    }

    pub(crate) fn set_pressed(&mut self, button: Button, pressed: bool, ic: &mut InterruptController) {
        let (dpad, bit) = button.line_bit();
        self.update(ic, |pad| {
            let mask = if dpad { &mut pad.dpad } else { &mut pad.action };
            if pressed {
                *mask |= 1 << bit;
            } else {
                *mask &= !(1 << bit);
            }
        });
    }

    /// Apply `change` and request the joypad interrupt if any input line
    /// fell from 1 to 0.
    fn update(&mut self, ic: &mut InterruptController, change: impl FnOnce(&mut Self)) {
        let before = self.low_nibble();
        change(self);
        let after = self.low_nibble();
        if before & !after != 0 {
            ic.request(Interrupt::Joypad);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_press_reads_low_and_interrupts() {
        let mut pad = Joypad::default();
        let mut ic = InterruptController::new();
        pad.write(0x20, &mut ic);
        assert_eq!(pad.read(), 0xEF);

        pad.set_pressed(Button::Down, true, &mut ic);
        assert_eq!(pad.read(), 0xE7);
        assert!(ic.is_requested(Interrupt::Joypad));
    }

    #[test]
    fn unselected_group_neither_reads_nor_interrupts() {
        let mut pad = Joypad::default();
        let mut ic = InterruptController::new();
        pad.write(0x10, &mut ic);

        pad.set_pressed(Button::Left, true, &mut ic);
        assert_eq!(pad.read() & 0x0F, 0x0F);
        assert!(!ic.is_requested(Interrupt::Joypad));

        // Selecting the d-pad while Left is held is itself a falling edge.
        pad.write(0x20, &mut ic);
        assert_eq!(pad.read() & 0x0F, 0x0D);
        assert!(ic.is_requested(Interrupt::Joypad));
    }

    #[test]
    fn release_does_not_interrupt() {
        let mut pad = Joypad::default();
        let mut ic = InterruptController::new();
        pad.write(0x10, &mut ic);
        pad.set_pressed(Button::Start, true, &mut ic);
        ic.acknowledge(Interrupt::Joypad);

        pad.set_pressed(Button::Start, false, &mut ic);
        assert!(!ic.is_requested(Interrupt::Joypad));
        assert_eq!(pad.read(), 0xDF);
    }

    #[test]
    fn both_groups_selected_combine() {
        let mut pad = Joypad::default();
        let mut ic = InterruptController::new();
        pad.write(0x00, &mut ic);
        pad.set_pressed(Button::Right, true, &mut ic);
        pad.set_pressed(Button::B, true, &mut ic);
        assert_eq!(pad.read(), 0xC0 | 0x0C);
    }

    #[test]
    fn key_layout() {
        assert_eq!(Button::from_key(Key::Z), Some(Button::A));
        assert_eq!(Button::from_key(Key::Backspace), Some(Button::Select));
        assert_eq!(Button::from_key(Key::Enter), Some(Button::Start));
        assert_eq!(Button::from_key(Key::None), None);
    }
}
