use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use super::region::MemoryRegion;

pub const TILE_COUNT: usize = 512;

/// One 8x8 background tile, decoded to 2-bit palette indices.
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
pub struct Tile {
    pixels: [[u8; 8]; 8],
}

impl Tile {
    /// Palette index (0..=3) of the pixel at `row`, `column`.
    pub const fn pixel(&self, row: usize, column: usize) -> u8 {
        self.pixels[row][column]
    }
}

/// The 8 KiB tile-data/tile-map memory, with a write-through tile cache.
///
/// Raw tile rows are stored planar: the even byte of a row holds the low
/// bit of each pixel, the odd byte the high bit, most significant bit
/// first. Every raw write re-decodes the one affected row so the cache
/// never goes stale and rendering never re-decodes.
#[serde_as]
#[derive(Clone, Serialize, Deserialize)]
pub struct VideoRam {
    region: MemoryRegion,
    #[serde_as(as = "[_; 512]")]
    tiles: [Tile; TILE_COUNT],
}

impl Default for VideoRam {
    fn default() -> Self {
        Self {
            region: MemoryRegion::new(0x2000, 0x1FFF),
            tiles: [Tile::default(); TILE_COUNT],
        }
    }
}

impl VideoRam {
    pub fn read_byte(&self, address: u16) -> u8 {
        self.region.read_byte(address)
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        self.region.write_byte(address, value);
        self.update_tile(address);
    }

    pub fn read_word(&self, address: u16) -> u16 {
        self.region.read_word(address)
    }

    pub fn write_word(&mut self, address: u16, value: u16) {
        self.write_byte(address, (value & 0xFF) as u8);
        self.write_byte(address.wrapping_add(1), (value >> 8) as u8);
    }

    pub const fn tile(&self, index: usize) -> &Tile {
        debug_assert!(index < TILE_COUNT);
        &self.tiles[index]
    }

    pub fn reset(&mut self) {
        self.region.reset();
        self.tiles = [Tile::default(); TILE_COUNT];
    }

    /// Re-decodes the tile row covering `address` from its two raw bytes.
    fn update_tile(&mut self, address: u16) {
        let mut address = address & 0x1FFF;
        // A row is two bytes, writing the odd one still redecodes from
        // the even one.
        address &= !1;

        let tile = usize::from(address >> 4);
        let row = usize::from((address >> 1) & 0x07);

        let low = self.region.read_byte(address);
        let high = self.region.read_byte(address + 1);

        for column in 0..8_usize {
            let bit = 7 - column;
            let pixel = ((low >> bit) & 1) | (((high >> bit) & 1) << 1);
            self.tiles[tile].pixels[row][column] = pixel;
        }
    }
}
