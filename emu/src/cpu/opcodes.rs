//! Opcode dispatch tables and handlers.
//!
//! Two dense 256-entry function-pointer tables: the primary opcode space
//! and the extended space reached through the 0xCB escape byte. Each
//! handler consumes its own operand bytes, mutates registers and memory,
//! and returns its cost in base clock cycles. A hole in either table is a
//! fatal decode error.

use super::registers::Registers;
use crate::error::EmuError;
use crate::memory::mmu::Mmu;

pub const EXTENDED_ESCAPE: u8 = 0xCB;

type OpHandler = fn(&mut Registers, &mut Mmu) -> u32;

/// Reads the byte at the program counter and advances it.
fn fetch_byte(registers: &mut Registers, mmu: &mut Mmu) -> u8 {
    mmu.read_byte(registers.increment_program_counter())
}

/// Reads a little-endian word operand, advancing the program counter twice.
fn fetch_word(registers: &mut Registers, mmu: &mut Mmu) -> u16 {
    let low = fetch_byte(registers, mmu);
    let high = fetch_byte(registers, mmu);

    u16::from_le_bytes([low, high])
}

/// Carry out of bit 3, common to additions and subtractions.
const fn half_carry(result: u8, target: u8, value: u8) -> bool {
    (result ^ target ^ value) & 0x10 != 0
}

fn add_to_accumulator(registers: &mut Registers, value: u8) {
    let original = registers.a;
    let (result, carry) = original.overflowing_add(value);
    registers.a = result;

    let mut flags = Registers::NONE;
    if result == 0 {
        flags |= Registers::ZERO;
    }
    if carry {
        flags |= Registers::CARRY;
    }
    if half_carry(result, original, value) {
        flags |= Registers::HALF_CARRY;
    }
    registers.flags = flags;
}

/// Computes `a - value` and the subtraction flags. The caller decides
/// whether to store the result (SUB) or discard it (CP).
fn subtract_value(registers: &mut Registers, value: u8) -> u8 {
    let original = registers.a;
    let result = original.wrapping_sub(value);

    let mut flags = Registers::SUBTRACTION;
    if result == 0 {
        flags |= Registers::ZERO;
    }
    if value > original {
        flags |= Registers::CARRY;
    }
    if half_carry(result, original, value) {
        flags |= Registers::HALF_CARRY;
    }
    registers.flags = flags;

    result
}

/// Increment updates Zero and Half-Carry, clears Subtraction, and leaves
/// Carry alone.
fn increment_value(registers: &mut Registers, value: u8) -> u8 {
    let result = value.wrapping_add(1);

    registers.set_flag(Registers::ZERO, result == 0);
    registers.set_flag(Registers::SUBTRACTION, false);
    registers.set_flag(Registers::HALF_CARRY, half_carry(result, value, 1));

    result
}

fn decrement_value(registers: &mut Registers, value: u8) -> u8 {
    let result = value.wrapping_sub(1);

    registers.set_flag(Registers::ZERO, result == 0);
    registers.set_flag(Registers::SUBTRACTION, true);
    registers.set_flag(Registers::HALF_CARRY, half_carry(result, value, 1));

    result
}

/// 9-bit rotate left: old Carry becomes bit 0, old bit 7 becomes Carry.
fn rotate_left_through_carry(registers: &mut Registers, value: u8) -> u8 {
    let carry_in = u8::from(registers.carry_flag());
    let carry_out = value & 0x80 != 0;
    let result = (value << 1) | carry_in;

    let mut flags = Registers::NONE;
    if result == 0 {
        flags |= Registers::ZERO;
    }
    if carry_out {
        flags |= Registers::CARRY;
    }
    registers.flags = flags;

    result
}

/// Signed relative jump. The operand is consumed either way; a taken
/// branch costs one extra cycle.
fn relative_jump(registers: &mut Registers, mmu: &mut Mmu, condition: bool) -> u32 {
    let operand = fetch_byte(registers, mmu);
    if !condition {
        return 2;
    }

    let displacement = i16::from(operand as i8);
    registers.program_counter = registers.program_counter.wrapping_add(displacement as u16);

    3
}

/// High byte first, decrementing per byte.
fn push_word(registers: &mut Registers, mmu: &mut Mmu, value: u16) {
    registers.stack_pointer = registers.stack_pointer.wrapping_sub(1);
    mmu.write_byte(registers.stack_pointer, (value >> 8) as u8);
    registers.stack_pointer = registers.stack_pointer.wrapping_sub(1);
    mmu.write_byte(registers.stack_pointer, (value & 0xFF) as u8);
}

/// Low byte first, incrementing per byte.
fn pop_word(registers: &mut Registers, mmu: &mut Mmu) -> u16 {
    let low = mmu.read_byte(registers.stack_pointer);
    registers.stack_pointer = registers.stack_pointer.wrapping_add(1);
    let high = mmu.read_byte(registers.stack_pointer);
    registers.stack_pointer = registers.stack_pointer.wrapping_add(1);

    u16::from_le_bytes([low, high])
}

macro_rules! load_immediate_op {
    ($name:ident, $field:ident) => {
        fn $name(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
            registers.$field = fetch_byte(registers, mmu);
            2
        }
    };
}

macro_rules! increment_op {
    ($name:ident, $field:ident) => {
        fn $name(registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
            registers.$field = increment_value(registers, registers.$field);
            1
        }
    };
}

macro_rules! decrement_op {
    ($name:ident, $field:ident) => {
        fn $name(registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
            registers.$field = decrement_value(registers, registers.$field);
            1
        }
    };
}

macro_rules! copy_op {
    ($name:ident, $destination:ident, $source:ident) => {
        fn $name(registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
            registers.$destination = registers.$source;
            1
        }
    };
}

fn nop(_registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
    1
}

increment_op!(increment_b, b);
increment_op!(increment_c, c);
increment_op!(increment_h, h);

decrement_op!(decrement_b, b);
decrement_op!(decrement_c, c);
decrement_op!(decrement_d, d);
decrement_op!(decrement_e, e);
decrement_op!(decrement_a, a);

load_immediate_op!(load_immediate_b, b);
load_immediate_op!(load_immediate_c, c);
load_immediate_op!(load_immediate_d, d);
load_immediate_op!(load_immediate_e, e);
load_immediate_op!(load_immediate_l, l);
load_immediate_op!(load_immediate_a, a);

copy_op!(copy_a_to_c, c, a);
copy_op!(copy_a_to_d, d, a);
copy_op!(copy_a_to_h, h, a);
copy_op!(copy_e_to_a, a, e);
copy_op!(copy_h_to_a, a, h);
copy_op!(copy_l_to_a, a, l);

fn load_immediate_de(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    let value = fetch_word(registers, mmu);
    registers.set_de(value);
    3
}

fn load_immediate_hl(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    let value = fetch_word(registers, mmu);
    registers.set_hl(value);
    3
}

fn load_immediate_stack_pointer(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    registers.stack_pointer = fetch_word(registers, mmu);
    3
}

// 16-bit increments touch no flags.
fn increment_de(registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
    registers.set_de(registers.de().wrapping_add(1));
    2
}

fn increment_hl(registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
    registers.set_hl(registers.hl().wrapping_add(1));
    1
}

fn increment_stack_pointer(registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
    registers.stack_pointer = registers.stack_pointer.wrapping_add(1);
    2
}

fn rotate_accumulator_left(registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
    registers.a = rotate_left_through_carry(registers, registers.a);
    2
}

fn jump_relative(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    relative_jump(registers, mmu, true)
}

fn jump_relative_not_zero(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    relative_jump(registers, mmu, !registers.zero_flag())
}

fn jump_relative_zero(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    relative_jump(registers, mmu, registers.zero_flag())
}

fn load_a_from_de_pointer(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    registers.a = mmu.read_byte(registers.de());
    2
}

fn store_a_at_hl_increment(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    mmu.write_byte(registers.hl(), registers.a);
    registers.set_hl(registers.hl().wrapping_add(1));
    2
}

fn store_a_at_hl_decrement(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    mmu.write_byte(registers.hl(), registers.a);
    registers.set_hl(registers.hl().wrapping_sub(1));
    2
}

fn store_a_at_hl(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    mmu.write_byte(registers.hl(), registers.a);
    2
}

fn add_b_to_accumulator(registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
    add_to_accumulator(registers, registers.b);
    1
}

fn subtract_b_from_accumulator(registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
    registers.a = subtract_value(registers, registers.b);
    1
}

/// XOR A,A always yields zero, so the flags are constant.
fn xor_accumulator_with_itself(registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
    registers.a = 0;
    registers.flags = Registers::ZERO;
    1
}

fn compare_hl_pointer(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    let value = mmu.read_byte(registers.hl());
    subtract_value(registers, value);
    // Quirk kept from the reference behavior: this comparison also
    // advances the program counter.
    registers.increment_program_counter();
    2
}

fn compare_immediate(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    let value = fetch_byte(registers, mmu);
    subtract_value(registers, value);
    2
}

fn pop_bc(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    let value = pop_word(registers, mmu);
    registers.set_bc(value);
    3
}

fn push_bc(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    push_word(registers, mmu, registers.bc());
    4
}

fn call(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    let target = fetch_word(registers, mmu);
    push_word(registers, mmu, registers.program_counter);
    registers.program_counter = target;
    5
}

fn ret(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    registers.program_counter = pop_word(registers, mmu);
    4
}

/// RST 38h: pushes the current program counter as-is and jumps to the
/// fixed vector.
fn restart_38(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    push_word(registers, mmu, registers.program_counter);
    registers.program_counter = 0x0038;
    4
}

fn store_a_high_immediate(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    let offset = fetch_byte(registers, mmu);
    mmu.write_byte(0xFF00 + u16::from(offset), registers.a);
    3
}

fn load_a_high_immediate(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    let offset = fetch_byte(registers, mmu);
    registers.a = mmu.read_byte(0xFF00 + u16::from(offset));
    3
}

fn store_a_high_c(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    mmu.write_byte(0xFF00 + u16::from(registers.c), registers.a);
    2
}

fn load_a_high_c(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    registers.a = mmu.read_byte(0xFF00 + u16::from(registers.c));
    2
}

fn store_a_absolute(registers: &mut Registers, mmu: &mut Mmu) -> u32 {
    let address = fetch_word(registers, mmu);
    mmu.write_byte(address, registers.a);
    4
}

fn rotate_c_left(registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
    registers.c = rotate_left_through_carry(registers, registers.c);
    2
}

fn bit_7_of_h(registers: &mut Registers, _mmu: &mut Mmu) -> u32 {
    registers.set_flag(Registers::ZERO, registers.h & 0x80 == 0);
    registers.set_flag(Registers::SUBTRACTION, false);
    registers.set_flag(Registers::HALF_CARRY, true);
    2
}

/// Both dispatch tables. Holes are undefined opcodes.
pub struct OpcodeTable {
    primary: [Option<OpHandler>; 256],
    extended: [Option<OpHandler>; 256],
}

impl Default for OpcodeTable {
    fn default() -> Self {
        let mut primary: [Option<OpHandler>; 256] = [None; 256];
        let mut extended: [Option<OpHandler>; 256] = [None; 256];

        primary[0x00] = Some(nop);
        primary[0x04] = Some(increment_b);
        primary[0x05] = Some(decrement_b);
        primary[0x06] = Some(load_immediate_b);
        primary[0x0C] = Some(increment_c);
        primary[0x0D] = Some(decrement_c);
        primary[0x0E] = Some(load_immediate_c);
        primary[0x11] = Some(load_immediate_de);
        primary[0x13] = Some(increment_de);
        primary[0x15] = Some(decrement_d);
        primary[0x16] = Some(load_immediate_d);
        primary[0x17] = Some(rotate_accumulator_left);
        primary[0x18] = Some(jump_relative);
        primary[0x1A] = Some(load_a_from_de_pointer);
        primary[0x1D] = Some(decrement_e);
        primary[0x1E] = Some(load_immediate_e);
        primary[0x20] = Some(jump_relative_not_zero);
        primary[0x21] = Some(load_immediate_hl);
        primary[0x22] = Some(store_a_at_hl_increment);
        primary[0x23] = Some(increment_hl);
        primary[0x24] = Some(increment_h);
        primary[0x28] = Some(jump_relative_zero);
        primary[0x2E] = Some(load_immediate_l);
        primary[0x31] = Some(load_immediate_stack_pointer);
        primary[0x32] = Some(store_a_at_hl_decrement);
        primary[0x33] = Some(increment_stack_pointer);
        primary[0x3D] = Some(decrement_a);
        primary[0x3E] = Some(load_immediate_a);
        primary[0x4F] = Some(copy_a_to_c);
        primary[0x57] = Some(copy_a_to_d);
        primary[0x67] = Some(copy_a_to_h);
        primary[0x77] = Some(store_a_at_hl);
        primary[0x7B] = Some(copy_e_to_a);
        primary[0x7C] = Some(copy_h_to_a);
        primary[0x7D] = Some(copy_l_to_a);
        primary[0x80] = Some(add_b_to_accumulator);
        primary[0x90] = Some(subtract_b_from_accumulator);
        primary[0xAF] = Some(xor_accumulator_with_itself);
        primary[0xBE] = Some(compare_hl_pointer);
        primary[0xC1] = Some(pop_bc);
        primary[0xC5] = Some(push_bc);
        primary[0xC9] = Some(ret);
        primary[0xCD] = Some(call);
        primary[0xE0] = Some(store_a_high_immediate);
        primary[0xE2] = Some(store_a_high_c);
        primary[0xEA] = Some(store_a_absolute);
        primary[0xF0] = Some(load_a_high_immediate);
        primary[0xF2] = Some(load_a_high_c);
        primary[0xFE] = Some(compare_immediate);
        primary[0xFF] = Some(restart_38);

        extended[0x11] = Some(rotate_c_left);
        extended[0x7C] = Some(bit_7_of_h);

        Self { primary, extended }
    }
}

impl OpcodeTable {
    /// Dispatches one already-fetched opcode byte. The 0xCB escape
    /// fetches its second byte here and dispatches into the extended
    /// table. Returns the handler's cycle cost.
    pub fn execute(
        &self,
        opcode: u8,
        registers: &mut Registers,
        mmu: &mut Mmu,
    ) -> Result<u32, EmuError> {
        if opcode == EXTENDED_ESCAPE {
            let extended = fetch_byte(registers, mmu);
            let handler = self.extended[usize::from(extended)]
                .ok_or(EmuError::UnknownExtendedOpcode(extended))?;

            return Ok(handler(registers, mmu));
        }

        let handler = self.primary[usize::from(opcode)].ok_or(EmuError::UnknownOpcode(opcode))?;

        Ok(handler(registers, mmu))
    }
}

#[cfg(test)]
mod tests {
    use super::{OpcodeTable, EXTENDED_ESCAPE};
    use crate::cpu::registers::Registers;
    use crate::error::EmuError;
    use crate::memory::mmu::Mmu;
    use pretty_assertions::assert_eq;
    use rand::Rng;

    /// Operands are fetched from the boot ROM overlay, so tests place
    /// them there and point the program counter at them.
    fn setup(operands: &[u8]) -> (Registers, Mmu, OpcodeTable) {
        let mut boot_rom = vec![0; 0x100];
        boot_rom[..operands.len()].copy_from_slice(operands);

        (
            Registers::default(),
            Mmu::new(boot_rom, vec![]),
            OpcodeTable::default(),
        )
    }

    fn run(
        table: &OpcodeTable,
        opcode: u8,
        registers: &mut Registers,
        mmu: &mut Mmu,
    ) -> u32 {
        table.execute(opcode, registers, mmu).unwrap()
    }

    #[test]
    fn undefined_opcodes_are_fatal() {
        let (mut registers, mut mmu, table) = setup(&[]);

        assert_eq!(
            table.execute(0xD3, &mut registers, &mut mmu),
            Err(EmuError::UnknownOpcode(0xD3))
        );
    }

    #[test]
    fn undefined_extended_opcodes_are_fatal() {
        let (mut registers, mut mmu, table) = setup(&[0x40]);

        assert_eq!(
            table.execute(EXTENDED_ESCAPE, &mut registers, &mut mmu),
            Err(EmuError::UnknownExtendedOpcode(0x40))
        );
        assert_eq!(registers.program_counter, 1);
    }

    #[test]
    fn increment_wraps_and_sets_flags() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.b = 0xFF;
        registers.set_flag(Registers::CARRY, true);

        let cycles = run(&table, 0x04, &mut registers, &mut mmu);

        assert_eq!(cycles, 1);
        assert_eq!(registers.b, 0);
        assert!(registers.zero_flag());
        assert!(registers.half_carry_flag());
        assert!(!registers.subtraction_flag());
        // Carry is untouched by 8-bit increments.
        assert!(registers.carry_flag());
    }

    #[test]
    fn increment_half_carry_at_nibble_boundary() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.c = 0x0F;

        run(&table, 0x0C, &mut registers, &mut mmu);

        assert_eq!(registers.c, 0x10);
        assert!(registers.half_carry_flag());
        assert!(!registers.zero_flag());
    }

    #[test]
    fn decrement_wraps_and_sets_flags() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.a = 0;

        run(&table, 0x3D, &mut registers, &mut mmu);

        assert_eq!(registers.a, 0xFF);
        assert!(!registers.zero_flag());
        assert!(registers.subtraction_flag());
        assert!(registers.half_carry_flag());
    }

    #[test]
    fn decrement_to_zero() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.b = 1;

        run(&table, 0x05, &mut registers, &mut mmu);

        assert_eq!(registers.b, 0);
        assert!(registers.zero_flag());
    }

    #[test]
    fn sixteen_bit_increment_cycle_costs() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.set_de(0x00FF);
        registers.set_hl(0xFFFF);
        registers.stack_pointer = 0xFFFE;

        assert_eq!(run(&table, 0x13, &mut registers, &mut mmu), 2);
        assert_eq!(run(&table, 0x23, &mut registers, &mut mmu), 1);
        assert_eq!(run(&table, 0x33, &mut registers, &mut mmu), 2);

        assert_eq!(registers.de(), 0x0100);
        assert_eq!(registers.hl(), 0x0000);
        assert_eq!(registers.stack_pointer, 0xFFFF);
        assert_eq!(registers.flags, Registers::NONE);
    }

    #[test]
    fn immediate_loads() {
        let (mut registers, mut mmu, table) = setup(&[0x42, 0x90, 0x01]);

        assert_eq!(run(&table, 0x3E, &mut registers, &mut mmu), 2);
        assert_eq!(registers.a, 0x42);

        assert_eq!(run(&table, 0x21, &mut registers, &mut mmu), 3);
        assert_eq!(registers.hl(), 0x0190);
        assert_eq!(registers.program_counter, 3);
    }

    #[test]
    fn add_sets_carry_and_half_carry() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.a = 0xFF;
        registers.b = 0x01;

        run(&table, 0x80, &mut registers, &mut mmu);

        assert_eq!(registers.a, 0);
        assert!(registers.zero_flag());
        assert!(registers.carry_flag());
        assert!(registers.half_carry_flag());
        assert!(!registers.subtraction_flag());
    }

    #[test]
    fn subtract_sets_borrow_flags() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.a = 0x10;
        registers.b = 0x20;

        run(&table, 0x90, &mut registers, &mut mmu);

        assert_eq!(registers.a, 0xF0);
        assert!(registers.carry_flag());
        assert!(registers.subtraction_flag());
        assert!(!registers.zero_flag());
    }

    #[test]
    fn xor_accumulator_clears_everything_but_zero() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.a = 0x5A;
        registers.flags = Registers::CARRY | Registers::SUBTRACTION;

        run(&table, 0xAF, &mut registers, &mut mmu);

        assert_eq!(registers.a, 0);
        assert_eq!(registers.flags, Registers::ZERO);
    }

    #[test]
    fn compare_immediate_is_non_destructive() {
        let (mut registers, mut mmu, table) = setup(&[0x42]);
        registers.a = 0x42;

        let cycles = run(&table, 0xFE, &mut registers, &mut mmu);

        assert_eq!(cycles, 2);
        assert_eq!(registers.a, 0x42);
        assert!(registers.zero_flag());
        assert!(registers.subtraction_flag());
    }

    #[test]
    fn compare_hl_pointer_advances_program_counter() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.a = 5;
        registers.set_hl(0xC000);
        mmu.write_byte(0xC000, 5);

        let cycles = run(&table, 0xBE, &mut registers, &mut mmu);

        assert_eq!(cycles, 2);
        assert!(registers.zero_flag());
        assert_eq!(registers.program_counter, 1);
    }

    #[test]
    fn rotate_left_feeds_carry_through() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.a = 0b0000_0001;

        run(&table, 0x17, &mut registers, &mut mmu);
        assert_eq!(registers.a, 0b0000_0010);

        registers.a = 0b0000_0001;
        registers.set_flag(Registers::CARRY, true);
        run(&table, 0x17, &mut registers, &mut mmu);
        assert_eq!(registers.a, 0b0000_0011);
        assert!(!registers.carry_flag());
    }

    #[test]
    fn rotate_left_captures_top_bit_in_carry() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.a = 0b1000_0000;

        run(&table, 0x17, &mut registers, &mut mmu);

        assert_eq!(registers.a, 0);
        assert!(registers.zero_flag());
        assert!(registers.carry_flag());
    }

    #[test]
    fn extended_rotate_c_left() {
        let (mut registers, mut mmu, table) = setup(&[0x11]);
        registers.c = 0b1000_0000;

        let cycles = run(&table, EXTENDED_ESCAPE, &mut registers, &mut mmu);

        assert_eq!(cycles, 2);
        assert_eq!(registers.c, 0);
        assert!(registers.zero_flag());
        assert!(registers.carry_flag());
        assert_eq!(registers.program_counter, 1);
    }

    #[test]
    fn extended_bit_test_on_h() {
        let (mut registers, mut mmu, table) = setup(&[0x7C, 0x7C]);
        registers.h = 0x80;
        registers.set_flag(Registers::CARRY, true);

        run(&table, EXTENDED_ESCAPE, &mut registers, &mut mmu);
        assert!(!registers.zero_flag());
        assert!(registers.half_carry_flag());
        assert!(!registers.subtraction_flag());
        assert!(registers.carry_flag());

        registers.h = 0x7F;
        run(&table, EXTENDED_ESCAPE, &mut registers, &mut mmu);
        assert!(registers.zero_flag());
    }

    #[test]
    fn relative_jump_backwards() {
        let mut cartridge = vec![0; 0x8000];
        cartridge[400] = 137;
        let mut registers = Registers::default();
        let mut mmu = Mmu::new(vec![0; 0x100], cartridge);
        let table = OpcodeTable::default();
        registers.program_counter = 400;

        let cycles = run(&table, 0x18, &mut registers, &mut mmu);

        assert_eq!(cycles, 3);
        assert_eq!(registers.program_counter, 282);
    }

    #[test]
    fn relative_jump_forwards() {
        let (mut registers, mut mmu, table) = setup(&[6]);

        run(&table, 0x18, &mut registers, &mut mmu);

        assert_eq!(registers.program_counter, 7);
    }

    #[test]
    fn conditional_jump_cycle_costs() {
        let (mut registers, mut mmu, table) = setup(&[2, 2]);

        // Zero clear: NZ taken, Z not taken.
        assert_eq!(run(&table, 0x20, &mut registers, &mut mmu), 3);
        assert_eq!(registers.program_counter, 3);

        registers.program_counter = 1;
        assert_eq!(run(&table, 0x28, &mut registers, &mut mmu), 2);
        assert_eq!(registers.program_counter, 2);
    }

    #[test]
    fn stack_push_pop_round_trip() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.stack_pointer = 0xC100;
        registers.set_bc(400);

        assert_eq!(run(&table, 0xC5, &mut registers, &mut mmu), 4);
        assert_eq!(registers.stack_pointer, 0xC0FE);
        // High byte pushed first.
        assert_eq!(mmu.read_byte(0xC0FF), 0x01);
        assert_eq!(mmu.read_byte(0xC0FE), 0x90);

        registers.set_bc(0);
        assert_eq!(run(&table, 0xC1, &mut registers, &mut mmu), 3);
        assert_eq!(registers.stack_pointer, 0xC100);
        assert_eq!(registers.bc(), 400);
    }

    #[test]
    fn random_stack_round_trips() {
        let (mut registers, mut mmu, table) = setup(&[]);
        let mut rng = rand::thread_rng();

        for _ in 0..32 {
            let value: u16 = rng.gen();
            registers.stack_pointer = 0xCF00;
            registers.set_bc(value);

            run(&table, 0xC5, &mut registers, &mut mmu);
            registers.set_bc(0);
            run(&table, 0xC1, &mut registers, &mut mmu);

            assert_eq!(registers.bc(), value);
            assert_eq!(registers.stack_pointer, 0xCF00);
        }
    }

    #[test]
    fn call_pushes_return_address() {
        let (mut registers, mut mmu, table) = setup(&[0x34, 0x12]);
        registers.stack_pointer = 0xC100;

        let cycles = run(&table, 0xCD, &mut registers, &mut mmu);

        assert_eq!(cycles, 5);
        assert_eq!(registers.program_counter, 0x1234);
        assert_eq!(registers.stack_pointer, 0xC0FE);
        // Return address is past both operand bytes.
        assert_eq!(mmu.read_word(0xC0FE), 2);
    }

    #[test]
    fn ret_pops_into_program_counter() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.stack_pointer = 0xC0FE;
        mmu.write_word(0xC0FE, 0x0190);

        let cycles = run(&table, 0xC9, &mut registers, &mut mmu);

        assert_eq!(cycles, 4);
        assert_eq!(registers.program_counter, 0x0190);
        assert_eq!(registers.stack_pointer, 0xC100);
    }

    #[test]
    fn restart_pushes_current_program_counter() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.program_counter = 0x0150;
        registers.stack_pointer = 0xC100;

        let cycles = run(&table, 0xFF, &mut registers, &mut mmu);

        assert_eq!(cycles, 4);
        assert_eq!(registers.program_counter, 0x0038);
        assert_eq!(mmu.read_word(0xC0FE), 0x0150);
    }

    #[test]
    fn pointer_stores_move_hl() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.a = 0x42;
        registers.set_hl(0x9FFF);

        run(&table, 0x32, &mut registers, &mut mmu);
        assert_eq!(mmu.read_byte(0x9FFF), 0x42);
        assert_eq!(registers.hl(), 0x9FFE);

        registers.set_hl(0xC000);
        run(&table, 0x22, &mut registers, &mut mmu);
        assert_eq!(mmu.read_byte(0xC000), 0x42);
        assert_eq!(registers.hl(), 0xC001);

        registers.a = 0x24;
        run(&table, 0x77, &mut registers, &mut mmu);
        assert_eq!(mmu.read_byte(0xC001), 0x24);
        assert_eq!(registers.hl(), 0xC001);
    }

    #[test]
    fn high_page_access() {
        let (mut registers, mut mmu, table) = setup(&[0x80, 0x80]);
        registers.a = 0x42;

        assert_eq!(run(&table, 0xE0, &mut registers, &mut mmu), 3);
        assert_eq!(mmu.read_byte(0xFF80), 0x42);

        registers.a = 0;
        assert_eq!(run(&table, 0xF0, &mut registers, &mut mmu), 3);
        assert_eq!(registers.a, 0x42);

        registers.c = 0x81;
        registers.a = 0x24;
        assert_eq!(run(&table, 0xE2, &mut registers, &mut mmu), 2);
        registers.a = 0;
        assert_eq!(run(&table, 0xF2, &mut registers, &mut mmu), 2);
        assert_eq!(registers.a, 0x24);
    }

    #[test]
    fn absolute_store() {
        let (mut registers, mut mmu, table) = setup(&[0x00, 0xC0]);
        registers.a = 0x42;

        assert_eq!(run(&table, 0xEA, &mut registers, &mut mmu), 4);
        assert_eq!(mmu.read_byte(0xC000), 0x42);
        assert_eq!(registers.program_counter, 2);
    }

    #[test]
    fn register_copies_leave_flags_alone() {
        let (mut registers, mut mmu, table) = setup(&[]);
        registers.a = 0x42;
        registers.flags = Registers::CARRY;

        run(&table, 0x4F, &mut registers, &mut mmu);
        run(&table, 0x57, &mut registers, &mut mmu);
        run(&table, 0x67, &mut registers, &mut mmu);

        assert_eq!(registers.c, 0x42);
        assert_eq!(registers.d, 0x42);
        assert_eq!(registers.h, 0x42);
        assert_eq!(registers.flags, Registers::CARRY);

        registers.e = 1;
        run(&table, 0x7B, &mut registers, &mut mmu);
        assert_eq!(registers.a, 1);
    }
}
