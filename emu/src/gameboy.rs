use serde::{Deserialize, Serialize};

use crate::cartridge_header::CartridgeHeader;
use crate::cpu::Cpu;
use crate::error::{EmuError, HeaderError};
use crate::memory::mmu::Mmu;
use crate::ppu::{screen::Screen, Ppu};

/// One frame is 154 scanlines of 114 base cycles each.
pub const CYCLES_PER_FRAME: u64 = 154 * 114;

/// The whole machine: CPU, display unit, address space and cartridge
/// header, stepped in lockstep by an external driver loop.
#[derive(Serialize, Deserialize)]
pub struct GameBoy {
    cpu: Cpu,
    ppu: Ppu,
    mmu: Mmu,
    cartridge_header: CartridgeHeader,
}

impl GameBoy {
    pub fn new(boot_rom: Vec<u8>, cartridge: Vec<u8>) -> Result<Self, HeaderError> {
        let cartridge_header = CartridgeHeader::new(&cartridge)?;

        Ok(Self {
            cpu: Cpu::default(),
            ppu: Ppu::default(),
            mmu: Mmu::new(boot_rom, cartridge),
            cartridge_header,
        })
    }

    pub const fn cartridge_header(&self) -> &CartridgeHeader {
        &self.cartridge_header
    }

    pub const fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub const fn screen(&self) -> &Screen {
        self.ppu.screen()
    }

    /// True once per completed frame; reading it clears it.
    pub fn take_frame_ready(&mut self) -> bool {
        self.ppu.take_frame_ready()
    }

    /// Executes one instruction and advances the display by the same
    /// number of cycles, keeping the two clocks in lockstep.
    pub fn step(&mut self) -> Result<u32, EmuError> {
        let cycles = self.cpu.step(&mut self.mmu)?;
        self.ppu.step(cycles, &mut self.mmu);

        Ok(cycles)
    }

    /// Runs until one frame's worth of cycles has elapsed on the CPU
    /// clock. Stops early if the CPU hits a fatal decode error.
    pub fn run_frame(&mut self) -> Result<(), EmuError> {
        let start = self.cpu.clock.base_value();
        while self.cpu.clock.base_value() - start < CYCLES_PER_FRAME {
            self.step()?;
        }

        Ok(())
    }

    /// Power-cycles everything back to the boot sequence.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.ppu.reset();
        self.mmu.reset();
    }
}
