pub mod registers;
pub mod screen;

use serde::{Deserialize, Serialize};

use self::screen::{Screen, SCREEN_WIDTH};
use crate::cpu::clock::Clock;
use crate::memory::mmu::Mmu;

/// Display timing modes, in scanline order. Each mode holds for a fixed
/// number of base cycles before transitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    OamRead,
    VramRead,
    HorizontalBlank,
    VerticalBlank,
}

impl Mode {
    const fn cycle_threshold(self) -> u64 {
        match self {
            Self::OamRead => 20,
            Self::VramRead => 43,
            Self::HorizontalBlank => 51,
            // Per vertical-blank scanline, one full line's worth.
            Self::VerticalBlank => 114,
        }
    }
}

/// The pixel-processing unit: a four-mode timing state machine that
/// renders one background scanline per visible line into the screen
/// buffer. It keeps its own clock, fed with the cycle cost of each CPU
/// instruction as it retires.
#[derive(Serialize, Deserialize)]
pub struct Ppu {
    mode: Mode,
    clock: Clock,
    screen: Screen,
    frame_ready: bool,
}

impl Default for Ppu {
    fn default() -> Self {
        Self {
            mode: Mode::OamRead,
            clock: Clock::default(),
            screen: Screen::default(),
            frame_ready: false,
        }
    }
}

impl Ppu {
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    /// True once per completed frame; reading it clears it.
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    /// Advances the state machine by `cycles` base units. At most one
    /// mode transition happens per call; below the active mode's
    /// threshold this only accumulates time.
    pub fn step(&mut self, cycles: u32, mmu: &mut Mmu) {
        self.clock.tick(cycles);

        if self.clock.base_value() < self.mode.cycle_threshold() {
            return;
        }
        self.clock.reset();

        match self.mode {
            Mode::OamRead => self.mode = Mode::VramRead,
            Mode::VramRead => {
                // Visible-pixel work for this line is done.
                self.render_scan_line(mmu);
                self.mode = Mode::HorizontalBlank;
            }
            Mode::HorizontalBlank => {
                let line = mmu.ppu_registers.current_scan_line();
                mmu.ppu_registers.set_current_scan_line(line + 1);

                if line == 143 {
                    // The buffer now holds a complete frame.
                    self.frame_ready = true;
                    self.mode = Mode::VerticalBlank;
                } else {
                    self.mode = Mode::OamRead;
                }
            }
            Mode::VerticalBlank => {
                let line = mmu.ppu_registers.current_scan_line();

                if line == 153 {
                    mmu.ppu_registers.set_current_scan_line(0);
                    self.mode = Mode::OamRead;
                } else {
                    mmu.ppu_registers.set_current_scan_line(line + 1);
                }
            }
        }
    }

    fn render_scan_line(&mut self, mmu: &Mmu) {
        let registers = &mmu.ppu_registers;
        if !registers.display_enabled() {
            return;
        }

        let line = registers.current_scan_line();
        let map_row_base = registers.tile_map_row_base();
        let pixel_row = usize::from(line.wrapping_add(registers.scroll_y()) & 0x07);

        let mut tile_column = u16::from(registers.scroll_x() >> 3) & 0x1F;
        let mut pixel_column = usize::from(registers.scroll_x() & 0x07);
        let mut tile_index =
            registers.resolve_tile_index(mmu.video_ram.read_byte(map_row_base + tile_column));

        for x in 0..SCREEN_WIDTH {
            let pixel = mmu.video_ram.tile(tile_index).pixel(pixel_row, pixel_column);
            self.screen
                .set_pixel(x, usize::from(line), registers.background_shade(pixel));

            pixel_column += 1;
            if pixel_column == 8 {
                pixel_column = 0;
                tile_column = (tile_column + 1) & 0x1F;
                tile_index = registers
                    .resolve_tile_index(mmu.video_ram.read_byte(map_row_base + tile_column));
            }
        }
    }

    pub fn reset(&mut self) {
        self.mode = Mode::OamRead;
        self.clock.reset();
        self.screen.reset();
        self.frame_ready = false;
    }
}
