use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;

/// CPU register file.
///
/// Eight 8-bit registers plus the 16-bit program counter and stack pointer.
/// The 8-bit registers pair up into the 16-bit views `bc`, `de` and `hl`,
/// with the first-named register holding the high byte.
#[derive(Default, Serialize, Deserialize)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    /// Condition flags. Only the top nibble is meaningful, see the
    /// associated flag constants.
    pub flags: u8,

    pub program_counter: u16,
    pub stack_pointer: u16,
}

impl Registers {
    pub const ZERO: u8 = 0x80;
    pub const SUBTRACTION: u8 = 0x40;
    pub const HALF_CARRY: u8 = 0x20;
    pub const CARRY: u8 = 0x10;
    pub const NONE: u8 = 0x00;

    /// Returns the current program counter and post-increments it. The
    /// fetch loop relies on getting the pre-increment address back.
    pub fn increment_program_counter(&mut self) -> u16 {
        let previous = self.program_counter;
        self.program_counter = self.program_counter.wrapping_add(1);

        previous
    }

    pub const fn zero_flag(&self) -> bool {
        self.flags & Self::ZERO != 0
    }

    pub const fn subtraction_flag(&self) -> bool {
        self.flags & Self::SUBTRACTION != 0
    }

    pub const fn half_carry_flag(&self) -> bool {
        self.flags & Self::HALF_CARRY != 0
    }

    pub const fn carry_flag(&self) -> bool {
        self.flags & Self::CARRY != 0
    }

    pub fn set_flag(&mut self, flag: u8, value: bool) {
        if value {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }

    pub fn bc(&self) -> u16 {
        let mut value = 0_u16;
        value.set_byte(1, self.b);
        value.set_byte(0, self.c);

        value
    }

    pub fn set_bc(&mut self, value: u16) {
        self.b = value.get_byte(1);
        self.c = value.get_byte(0);
    }

    pub fn de(&self) -> u16 {
        let mut value = 0_u16;
        value.set_byte(1, self.d);
        value.set_byte(0, self.e);

        value
    }

    pub fn set_de(&mut self, value: u16) {
        self.d = value.get_byte(1);
        self.e = value.get_byte(0);
    }

    pub fn hl(&self) -> u16 {
        let mut value = 0_u16;
        value.set_byte(1, self.h);
        value.set_byte(0, self.l);

        value
    }

    pub fn set_hl(&mut self, value: u16) {
        self.h = value.get_byte(1);
        self.l = value.get_byte(0);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
