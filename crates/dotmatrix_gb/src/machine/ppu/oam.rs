use serde::{Deserialize, Serialize};

use super::registers::Lcdc;
use super::Ppu;

/// Most objects the hardware will draw on a single line.
pub(crate) const MAX_SPRITES_PER_LINE: usize = 10;

pub(super) const ATTR_BG_PRIORITY: u8 = 0x80;
pub(super) const ATTR_Y_FLIP: u8 = 0x40;
pub(super) const ATTR_X_FLIP: u8 = 0x20;
pub(super) const ATTR_PALETTE: u8 = 0x10;

/// One OAM entry selected for the current line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Sprite {
    /// Screen Y plus 16, as stored in OAM.
    pub(crate) y: u8,
    /// Screen X plus 8, as stored in OAM.
    pub(crate) x: u8,
    pub(crate) tile: u8,
    pub(crate) attrs: u8,
    pub(crate) oam_index: u8,
    /// Object height when the line was scanned. LCDC.2 changes later in
    /// the line do not resize objects already selected.
    pub(crate) height: u8,
}

impl Ppu {
    #[inline]
    pub(super) fn sprite_height(&self) -> u8 {
        if self.lcdc().contains(Lcdc::OBJ_TALL) {
            16
        } else {
            8
        }
    }

    /// Select the objects covering the current line, in OAM order, then
    /// sort them into drawing priority: lower X first, ties by OAM index.
    pub(super) fn scan_oam(&mut self) {
        let height = self.sprite_height();
        let line = u16::from(self.ly) + 16;

        self.line_sprites.clear();
        for (index, entry) in self.oam.chunks_exact(4).enumerate() {
            let y = u16::from(entry[0]);
            if line >= y && line < y + u16::from(height) {
                self.line_sprites.push(Sprite {
                    y: entry[0],
                    x: entry[1],
                    tile: entry[2],
                    attrs: entry[3],
                    oam_index: index as u8,
                    height,
                });
                if self.line_sprites.len() == MAX_SPRITES_PER_LINE {
                    break;
                }
            }
        }

        self.line_sprites
            .sort_by_key(|sprite| (sprite.x, sprite.oam_index));
    }
}
