use super::oam::{ATTR_BG_PRIORITY, ATTR_PALETTE, ATTR_X_FLIP, ATTR_Y_FLIP};
use super::registers::Lcdc;
use super::Ppu;
use crate::SCREEN_WIDTH;

#[inline]
fn shade(palette: u8, color: u8) -> u8 {
    (palette >> (color * 2)) & 0x03
}

impl Ppu {
    /// Compose pixel `x` of the current line into the back buffer.
    pub(super) fn render_pixel(&mut self, x: u8) {
        let lcdc = self.lcdc();

        let bg_color = if lcdc.contains(Lcdc::BG_WINDOW_ENABLE) {
            if self.window_covers(x) {
                self.window_drawn = true;
                self.window_color(x)
            } else {
                self.background_color(x)
            }
        } else {
            0
        };

        let mut pixel = shade(self.bgp, bg_color);
        if lcdc.contains(Lcdc::OBJ_ENABLE) {
            if let Some((color, attrs)) = self.sprite_color(x) {
                if attrs & ATTR_BG_PRIORITY == 0 || bg_color == 0 {
                    let palette = if attrs & ATTR_PALETTE != 0 {
                        self.obp1
                    } else {
                        self.obp0
                    };
                    pixel = shade(palette, color);
                }
            }
        }

        let offset = usize::from(self.ly) * SCREEN_WIDTH + usize::from(x);
        self.back.set(offset, pixel);
    }

    fn window_covers(&self, x: u8) -> bool {
        self.window_triggered
            && self.lcdc().contains(Lcdc::WINDOW_ENABLE)
            && u16::from(x) + 7 >= u16::from(self.wx)
    }

    fn background_color(&self, x: u8) -> u8 {
        let map_base = if self.lcdc().contains(Lcdc::BG_TILE_MAP) {
            0x1C00
        } else {
            0x1800
        };
        let bg_x = x.wrapping_add(self.scx);
        let bg_y = self.ly.wrapping_add(self.scy);
        self.tile_map_color(map_base, bg_x, bg_y)
    }

    fn window_color(&self, x: u8) -> u8 {
        let map_base = if self.lcdc().contains(Lcdc::WINDOW_TILE_MAP) {
            0x1C00
        } else {
            0x1800
        };
        let win_x = (u16::from(x) + 7 - u16::from(self.wx)) as u8;
        self.tile_map_color(map_base, win_x, self.window_line)
    }

    /// Colour index at (`px`, `py`) of the 256x256 map starting at
    /// VRAM offset `map_base`.
    fn tile_map_color(&self, map_base: usize, px: u8, py: u8) -> u8 {
        let map_offset = map_base + usize::from(py / 8) * 32 + usize::from(px / 8);
        let tile = self.vram[map_offset];

        let tile_base = if self.lcdc().contains(Lcdc::TILE_DATA_UNSIGNED) {
            usize::from(tile) * 16
        } else {
            // $8800 addressing: signed index relative to $9000.
            (0x1000 + i32::from(tile as i8) * 16) as usize
        };

        self.tile_row_color(tile_base + usize::from(py & 7) * 2, 7 - (px & 7))
    }

    #[inline]
    fn tile_row_color(&self, row_offset: usize, bit: u8) -> u8 {
        let lo = (self.vram[row_offset] >> bit) & 0x01;
        let hi = (self.vram[row_offset + 1] >> bit) & 0x01;
        (hi << 1) | lo
    }

    /// First opaque sprite pixel at `x` in priority order, with its
    /// attributes.
    fn sprite_color(&self, x: u8) -> Option<(u8, u8)> {
        let screen_x = u16::from(x) + 8;

        self.line_sprites.iter().find_map(|sprite| {
            let left = u16::from(sprite.x);
            if screen_x < left || screen_x >= left + 8 {
                return None;
            }

            let height = sprite.height;
            let mut row = self.ly.wrapping_add(16).wrapping_sub(sprite.y) & (height - 1);
            if sprite.attrs & ATTR_Y_FLIP != 0 {
                row = height - 1 - row;
            }
            let mut column = (screen_x - left) as u8;
            if sprite.attrs & ATTR_X_FLIP != 0 {
                column = 7 - column;
            }

            let tile = if height == 16 {
                sprite.tile & 0xFE
            } else {
                sprite.tile
            };
            let row_offset = usize::from(tile) * 16 + usize::from(row) * 2;
            let color = self.tile_row_color(row_offset, 7 - column);
            (color != 0).then_some((color, sprite.attrs))
        })
    }
}
