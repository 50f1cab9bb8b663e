use thiserror::Error;

/// Fatal execution errors. An undefined opcode stops the CPU: there is no
/// way to guess how many operand bytes it would have consumed, so decoding
/// cannot resume past it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EmuError {
    #[error("undefined operation code: {0:#04X}")]
    UnknownOpcode(u8),

    #[error("undefined extended operation code: {0:#04X}")]
    UnknownExtendedOpcode(u8),

    /// The CPU halted on a previous decode error and refuses further steps.
    #[error("cpu is stopped")]
    CpuStopped,
}

/// Cartridge-header parsing errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    #[error("cartridge image too short for a header: {0} bytes")]
    TooShort(usize),

    #[error("cartridge title is not valid ASCII")]
    InvalidTitle,
}
