use dotmatrix_common::Color;
use serde::{Deserialize, Serialize};

use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// One 160x144 frame, row-major, one DMG shade (0 = lightest, 3 = darkest)
/// per pixel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framebuffer {
    pixels: Vec<u8>,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }
}

impl Framebuffer {
    pub fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    pub fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Shade at (`x`, `y`); out-of-range coordinates read as 0.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        if x >= SCREEN_WIDTH {
            return 0;
        }
        self.pixels.get(y * SCREEN_WIDTH + x).copied().unwrap_or(0)
    }

    /// Resolve shades through `palette` into packed RGB (3 bytes per
    /// pixel). Stops at whichever of the frame or `out` ends first.
    pub fn to_rgb(&self, palette: &[Color; 4], out: &mut [u8]) {
        for (rgb, &shade) in out.chunks_exact_mut(3).zip(&self.pixels) {
            let color = palette[usize::from(shade & 0x03)];
            rgb[0] = color.r;
            rgb[1] = color.g;
            rgb[2] = color.b;
        }
    }

    pub(crate) fn set(&mut self, offset: usize, shade: u8) {
        if let Some(slot) = self.pixels.get_mut(offset) {
            *slot = shade;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.pixels.fill(0);
    }
}
