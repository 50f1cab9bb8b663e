pub mod clock;
pub mod opcodes;
pub mod registers;

use serde::{Deserialize, Serialize};

use self::clock::Clock;
use self::opcodes::OpcodeTable;
use self::registers::Registers;
use crate::error::EmuError;
use crate::memory::mmu::Mmu;

/// The processor: register file, clock, and dispatch tables, driven by a
/// fetch/decode/execute loop over the memory bus.
#[derive(Default, Serialize, Deserialize)]
pub struct Cpu {
    pub registers: Registers,
    pub clock: Clock,
    #[serde(skip)]
    opcodes: OpcodeTable,
    stopped: bool,
}

impl Cpu {
    /// Fetches and executes one instruction, advancing the clock by its
    /// cycle cost. Returns that cost so the caller can step the display
    /// by the same amount.
    ///
    /// A decode failure stops the CPU permanently: operand lengths of
    /// unknown opcodes are unknowable, so execution cannot resynchronize
    /// past one.
    pub fn step(&mut self, mmu: &mut Mmu) -> Result<u32, EmuError> {
        if self.stopped {
            return Err(EmuError::CpuStopped);
        }

        let opcode = mmu.read_byte(self.registers.increment_program_counter());
        match self.opcodes.execute(opcode, &mut self.registers, mmu) {
            Ok(cycles) => {
                self.clock.tick(cycles);
                Ok(cycles)
            }
            Err(error) => {
                self.stopped = true;
                logger::log(format!("cpu stopped: {error}"));
                Err(error)
            }
        }
    }

    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn reset(&mut self) {
        self.registers.reset();
        self.clock.reset();
        self.stopped = false;
    }
}
