use serde::{Deserialize, Serialize};

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

/// The 160x144 output pixel buffer, flat RGBA bytes ready to blit.
#[derive(Clone, Serialize, Deserialize)]
pub struct Screen {
    data: Vec<u8>,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            data: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT * 4],
        }
    }
}

impl Screen {
    /// Writes one grayscale pixel: R, G and B get the shade, alpha is
    /// fully opaque.
    pub fn set_pixel(&mut self, x: usize, y: usize, shade: u8) {
        debug_assert!(x < SCREEN_WIDTH && y < SCREEN_HEIGHT);

        let offset = (y * SCREEN_WIDTH + x) * 4;
        self.data[offset] = shade;
        self.data[offset + 1] = shade;
        self.data[offset + 2] = shade;
        self.data[offset + 3] = 255;
    }

    /// The raw RGBA bytes, `SCREEN_WIDTH * SCREEN_HEIGHT * 4` of them.
    pub fn pixel_data(&self) -> &[u8] {
        &self.data
    }

    pub fn reset(&mut self) {
        self.data.fill(0);
    }
}
