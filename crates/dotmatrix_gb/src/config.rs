use dotmatrix_common::Color;
use typed_builder::TypedBuilder;

/// Power-on contents of work RAM and HRAM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RamInit {
    /// Fill with a deterministic xorshift sequence. Real DMG RAM powers up
    /// with noise, and some games depend on it not being all zero.
    Pseudorandom { seed: u32 },
    Zeroed,
}

impl Default for RamInit {
    fn default() -> Self {
        RamInit::Pseudorandom { seed: 0xC0DE_1234 }
    }
}

/// Host-side settings for a session.
///
/// These are not part of the emulated machine, so snapshots neither store
/// nor restore them.
#[derive(Clone, Debug, TypedBuilder)]
pub struct EmulatorConfig {
    /// RGB values for shades 0 (lightest) to 3 (darkest).
    #[builder(default = DMG_GREYSCALE)]
    pub palette: [Color; 4],
    #[builder(default)]
    pub ram_init: RamInit,
}

pub const DMG_GREYSCALE: [Color; 4] = [
    Color::WHITE,
    Color::LIGHT_GRAY,
    Color::DARK_GRAY,
    Color::BLACK,
];

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
