use crate::instruction::InstructionSize;

/// Why a single instruction word failed to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("No instruction set handles opcode {0:#04x}")]
    UnknownOpcode(u8),

    #[error("Illegal instruction")]
    Illegal,

    #[error("Reserved encoding")]
    Reserved,

    #[error("c.lui with destination x0")]
    LuiZeroDestination,

    #[error("Instruction not supported by the selected extensions")]
    Unsupported,
}

/// A word the decoder could not turn into an instruction
///
/// Carries the attempted size so a scanning caller can step over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Failed to decode {size} word {raw:#010x}: {error}")]
pub struct DecodeFailure {
    pub raw: u32,
    pub size: InstructionSize,
    #[source]
    pub error: DecodeError,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeFailure),
    #[error("Malformed hex instruction word: '{0}'")]
    MalformedHex(String),
    #[error("Tried to read past end of input")]
    ReadingPastEof,
}

/// ISA configuration string errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IsaError {
    #[error("ISA string '{0}' does not name the 32I base")]
    MissingBase(String),
    #[error("Unknown extension: '{0}'")]
    UnknownExtension(char),
}
