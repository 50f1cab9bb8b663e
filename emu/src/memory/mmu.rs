use serde::{Deserialize, Serialize};

use super::region::MemoryRegion;
use super::vram::VideoRam;
use crate::ppu::registers::PpuRegisters;

pub const BOOT_ROM_SIZE: usize = 0x100;

/// The 16-bit address-space router.
///
/// Owns every addressable store and the display registers; the CPU and
/// the display state machine both go through it. Stubbed regions
/// (cartridge RAM, OAM, input, timers, interrupts) read as 0 and drop
/// writes, since real programs touch them freely.
#[derive(Serialize, Deserialize)]
pub struct Mmu {
    /// While set, the first 256 bytes of the address space read from the
    /// boot ROM instead of the cartridge. Reading 0x0100, the first
    /// cartridge instruction, clears it.
    booting: bool,
    boot_rom: MemoryRegion,
    rom: MemoryRegion,
    pub video_ram: VideoRam,
    working_ram: MemoryRegion,
    zero_page: MemoryRegion,
    pub ppu_registers: PpuRegisters,
}

impl Mmu {
    pub fn new(boot_rom: Vec<u8>, cartridge: Vec<u8>) -> Self {
        Self {
            booting: true,
            boot_rom: MemoryRegion::with_data(boot_rom, 0x00FF),
            // Banks 0 and 1 both resolve into this one store. Bank
            // switching is not implemented.
            rom: MemoryRegion::with_data(cartridge, 0x7FFF),
            video_ram: VideoRam::default(),
            working_ram: MemoryRegion::new(0x2000, 0x1FFF),
            zero_page: MemoryRegion::new(0x7F, 0x007F),
            ppu_registers: PpuRegisters::default(),
        }
    }

    pub const fn is_booting(&self) -> bool {
        self.booting
    }

    pub fn read_byte(&mut self, address: u16) -> u8 {
        match address {
            0x0000..=0x3FFF => {
                if self.booting {
                    if usize::from(address) < BOOT_ROM_SIZE {
                        return self.boot_rom.read_byte(address);
                    }
                    if usize::from(address) == BOOT_ROM_SIZE {
                        self.booting = false;
                        logger::log("leaving boot rom overlay");
                    }
                }

                self.rom.read_byte(address)
            }
            0x4000..=0x7FFF => self.rom.read_byte(address),
            0x8000..=0x9FFF => self.video_ram.read_byte(address),
            0xA000..=0xBFFF => {
                logger::log(format!("cartridge ram read (stub): {address:#06X}"));
                0
            }
            // Working RAM, echoed across 0xE000-0xFDFF by the mask.
            0xC000..=0xFDFF => self.working_ram.read_byte(address),
            0xFE00..=0xFE9F => {
                logger::log(format!("oam read (stub): {address:#06X}"));
                0
            }
            0xFEA0..=0xFEFF => 0,
            0xFF00..=0xFF7F => self.read_io(address),
            0xFF80..=0xFFFE => self.zero_page.read_byte(address),
            0xFFFF => {
                logger::log("interrupt enable read (stub)");
                0
            }
        }
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x7FFF => {
                logger::log(format!("rom bank select write (stub): {address:#06X}"));
            }
            0x8000..=0x9FFF => self.video_ram.write_byte(address, value),
            0xA000..=0xBFFF => {
                logger::log(format!("cartridge ram write (stub): {address:#06X}"));
            }
            0xC000..=0xFDFF => self.working_ram.write_byte(address, value),
            0xFE00..=0xFE9F => {
                logger::log(format!("oam write (stub): {address:#06X}"));
            }
            0xFEA0..=0xFEFF => {}
            0xFF00..=0xFF7F => self.write_io(address, value),
            0xFF80..=0xFFFE => self.zero_page.write_byte(address, value),
            0xFFFF => logger::log("interrupt enable write (stub)"),
        }
    }

    pub fn read_word(&mut self, address: u16) -> u16 {
        let low = self.read_byte(address);
        let high = self.read_byte(address.wrapping_add(1));

        u16::from_le_bytes([low, high])
    }

    pub fn write_word(&mut self, address: u16, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.write_byte(address, low);
        self.write_byte(address.wrapping_add(1), high);
    }

    fn read_io(&self, address: u16) -> u8 {
        match address {
            0xFF40..=0xFF4B => self.ppu_registers.read_byte(address),
            // Input, serial, timers, interrupt flags, audio: all stubs.
            0xFF00 | 0xFF01 | 0xFF02 | 0xFF04..=0xFF07 | 0xFF0F => {
                logger::log(format!("io read (stub): {address:#06X}"));
                0
            }
            _ => 0,
        }
    }

    fn write_io(&mut self, address: u16, value: u8) {
        match address {
            0xFF40..=0xFF4B => self.ppu_registers.write_byte(address, value),
            0xFF00 | 0xFF01 | 0xFF02 | 0xFF04..=0xFF07 | 0xFF0F => {
                logger::log(format!("io write (stub): {address:#06X}"));
            }
            _ => {}
        }
    }

    /// Restores the power-on state: boot overlay active, RAM zeroed, ROM
    /// back to the cartridge image.
    pub fn reset(&mut self) {
        self.booting = true;
        self.boot_rom.reset();
        self.rom.reset();
        self.video_ram.reset();
        self.working_ram.reset();
        self.zero_page.reset();
        self.ppu_registers.reset();
    }
}
