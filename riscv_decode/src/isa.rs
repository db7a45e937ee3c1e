//! Extension selection and the opcode tables each extension contributes
use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::{error::IsaError, DecodeError, Instruction};

pub mod base;
pub mod compressed;
pub mod mul;
pub mod opcode;
pub mod vector;

pub use opcode::Opcode;

/// A table handler
///
/// `Ok(None)` means the word belongs to another extension sharing the same key and
/// the next handler should be tried. `Err` stops the chain.
pub type DecodeFn = fn(u32) -> Result<Option<Instruction>, DecodeError>;

/// Where a handler is registered in the dispatch tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeKey {
    /// Major opcode of a 32-bit word (bits [6:0])
    Standard(Opcode),
    /// Quadrant of a 16-bit word (bits [1:0]), 0..=2
    Compressed(u8),
}

/// An instruction set extension the decoder knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Extension {
    /// RV32I - Base integer instruction set
    I,
    /// RV32M - Integer multiply/divide
    M,
    /// RVC - Compressed instructions
    C,
    /// RVV - Vector instructions
    V,
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extension::I => write!(f, "RV32I (Base Integer)"),
            Extension::M => write!(f, "RV32M (Multiply/Divide)"),
            Extension::C => write!(f, "RVC (Compressed)"),
            Extension::V => write!(f, "RVV (Vector)"),
        }
    }
}

/// One extension's contribution to the decoder
pub trait InstructionSet: Sync {
    fn extension(&self) -> Extension;

    /// Handlers keyed by opcode or quadrant; a key may repeat
    fn opcode_table(&self) -> &'static [(OpcodeKey, DecodeFn)];
}

/// RISC-V ISA configuration using builder pattern
///
/// The base integer set is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Isa {
    /// Multiply/divide extension
    m: bool,
    /// Compressed instruction extension
    c: bool,
    /// Vector extension
    v: bool,
}

impl Isa {
    /// RV32I only
    pub const fn new() -> Self {
        Self { m: false, c: false, v: false }
    }

    /// Enable multiply/divide extension (M)
    pub const fn with_m(mut self) -> Self {
        self.m = true;
        self
    }

    /// Enable compressed instruction extension (C)
    pub const fn with_c(mut self) -> Self {
        self.c = true;
        self
    }

    /// Enable vector extension (V)
    pub const fn with_v(mut self) -> Self {
        self.v = true;
        self
    }

    /// Common RV32IMC configuration
    pub const fn rv32imc() -> Self {
        Self::new().with_m().with_c()
    }

    pub const fn multiply_enabled(&self) -> bool {
        self.m
    }

    pub const fn compressed_enabled(&self) -> bool {
        self.c
    }

    pub const fn vector_enabled(&self) -> bool {
        self.v
    }

    /// Enabled extensions in composition order
    pub fn extensions(&self) -> Vec<Extension> {
        let mut extensions = vec![Extension::I];
        if self.m {
            extensions.push(Extension::M);
        }
        if self.c {
            extensions.push(Extension::C);
        }
        if self.v {
            extensions.push(Extension::V);
        }
        extensions
    }

    /// The instruction set implementations for every enabled extension
    pub fn instruction_sets(&self) -> Vec<&'static dyn InstructionSet> {
        self.extensions()
            .into_iter()
            .map(|extension| -> &'static dyn InstructionSet {
                match extension {
                    Extension::I => &base::Base,
                    Extension::M => &mul::Multiply,
                    Extension::C => &compressed::Compressed,
                    Extension::V => &vector::Vector,
                }
            })
            .collect()
    }
}

impl Default for Isa {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RV32I")?;
        if self.m {
            write!(f, "M")?;
        }
        if self.c {
            write!(f, "C")?;
        }
        if self.v {
            write!(f, "V")?;
        }
        Ok(())
    }
}

impl FromStr for Isa {
    type Err = IsaError;

    /// Parses `32IMC`, `RV32ICV`, `rv32i`, ... Extension letters may come in any order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("RV").unwrap_or(&upper);
        let letters = name.strip_prefix("32I").ok_or_else(|| IsaError::MissingBase(s.to_string()))?;

        letters.chars().try_fold(Isa::new(), |isa, letter| match letter {
            'M' => Ok(isa.with_m()),
            'C' => Ok(isa.with_c()),
            'V' => Ok(isa.with_v()),
            'I' => Ok(isa),
            other => Err(IsaError::UnknownExtension(other)),
        })
    }
}

impl TryFrom<String> for Isa {
    type Error = IsaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
