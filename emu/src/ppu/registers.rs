use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;

/// The four background grayscale levels, from lightest to darkest.
const SHADES: [u8; 4] = [255, 192, 96, 0];

/// Memory-mapped display control registers (0xFF40-0xFF4B).
///
/// The control byte packs the enable flags and tile-map/tile-set
/// selectors; scroll, palette and scanline registers are plain bytes.
/// The current scanline lives here because the CPU reads it through the
/// memory bus while the display state machine advances it.
#[derive(Default, Serialize, Deserialize)]
pub struct PpuRegisters {
    control: u8,
    scroll_x: u8,
    scroll_y: u8,
    window_x: u8,
    window_y: u8,
    current_scan_line: u8,
    scan_line_compare: u8,
    background_palette: u8,
}

impl PpuRegisters {
    pub fn read_byte(&self, address: u16) -> u8 {
        match address {
            0xFF40 => self.control,
            0xFF42 => self.scroll_y,
            0xFF43 => self.scroll_x,
            0xFF44 => self.current_scan_line,
            0xFF45 => self.scan_line_compare,
            0xFF47 => self.background_palette,
            0xFF4A => self.window_y,
            0xFF4B => self.window_x,
            _ => {
                logger::log(format!("unhandled display register read: {address:#06X}"));
                0
            }
        }
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        match address {
            0xFF40 => self.control = value,
            0xFF42 => self.scroll_y = value,
            0xFF43 => self.scroll_x = value,
            // The scanline counter is read-only from the bus side.
            0xFF44 => {}
            0xFF45 => self.scan_line_compare = value,
            0xFF47 => self.background_palette = value,
            0xFF4A => self.window_y = value,
            0xFF4B => self.window_x = value,
            _ => logger::log(format!("unhandled display register write: {address:#06X}")),
        }
    }

    pub fn display_enabled(&self) -> bool {
        self.control.get_bit(7)
    }

    pub fn background_enabled(&self) -> bool {
        self.control.get_bit(0)
    }

    /// Which of the two 32x32 tile maps the background uses.
    pub fn background_tile_map(&self) -> bool {
        self.control.get_bit(3)
    }

    /// Which tile-set addressing mode the background uses. Selector 1
    /// treats tile indices below 128 as belonging to the upper bank.
    pub fn background_tile_set(&self) -> bool {
        self.control.get_bit(4)
    }

    pub const fn scroll_x(&self) -> u8 {
        self.scroll_x
    }

    pub const fn scroll_y(&self) -> u8 {
        self.scroll_y
    }

    pub const fn current_scan_line(&self) -> u8 {
        self.current_scan_line
    }

    pub fn set_current_scan_line(&mut self, line: u8) {
        debug_assert!(line <= 153);
        self.current_scan_line = line;
    }

    /// Tile-map address (within video memory) of the row of tiles the
    /// current scanline falls into, after vertical scrolling.
    pub fn tile_map_row_base(&self) -> u16 {
        let base: u16 = if self.background_tile_map() {
            0x1C00
        } else {
            0x1800
        };
        let row = (u16::from(self.current_scan_line) + u16::from(self.scroll_y)) & 0xFF;

        base + ((row >> 3) << 5)
    }

    /// Resolves a raw tile-map byte to a tile-cache index, applying the
    /// selector-1 upper-bank rule.
    pub fn resolve_tile_index(&self, raw: u8) -> usize {
        if self.background_tile_set() && raw < 128 {
            usize::from(raw) + 256
        } else {
            usize::from(raw)
        }
    }

    /// Maps a 2-bit pixel value through the background palette to a
    /// grayscale intensity.
    pub fn background_shade(&self, pixel: u8) -> u8 {
        SHADES[usize::from((self.background_palette >> (pixel * 2)) & 0x03)]
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
