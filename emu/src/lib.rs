#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
mod bitwise;

#[allow(clippy::similar_names)]
pub mod cartridge_header;
pub mod cpu;
pub mod error;
pub mod gameboy;

#[allow(clippy::missing_panics_doc)]
#[allow(clippy::unreadable_literal)]
pub mod memory;
pub mod ppu;
