//! RISC-V RV32 instruction decoder for the I, M, C and V extensions
//!
//! ```
//! use riscv_decode::{Decoder, Isa};
//!
//! let decoder = Decoder::new(&"32IMC".parse::<Isa>().unwrap());
//! let add = decoder.decode_hex("00e787b3").unwrap();
//! assert_eq!(add.to_string(), "add a5,a5,a4");
//! ```
pub mod bitfield;
pub mod decoder;
pub mod error;
pub mod format;
pub mod instruction;
pub mod isa;
pub mod register;
mod render;

pub use decoder::Decoder;
pub use error::{DecodeError, DecodeFailure, Error, IsaError};
pub use format::Format;
pub use instruction::{
    ControlFlow, ElementWidth, Instruction, InstructionClass, InstructionSize, Mask, VectorWidth,
};
pub use isa::{DecodeFn, Extension, InstructionSet, Isa, OpcodeKey};
pub use register::Register;
