//! Architectural register names
use std::{borrow::Cow, fmt, str::FromStr};

use serde::Serialize;

/// ABI names of the integer registers, indexed by register number
const ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// A register operand
///
/// Integer and vector registers are what the decoder mostly produces. Floating point
/// registers only appear as the scalar operand of `.vf` vector instructions and of
/// `vfmv.f.s`/`vfmv.s.f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub enum Register {
    /// Integer register `x0..x31`
    X(u8),
    /// Floating point register `f0..f31`
    F(u8),
    /// Vector register `v0..v31`
    V(u8),
}

impl Register {
    pub const ZERO: Register = Register::X(0);
    pub const RA: Register = Register::X(1);
    pub const SP: Register = Register::X(2);

    /// Integer register from a 5-bit field
    pub const fn x(field: u32) -> Self {
        Register::X((field & 0x1f) as u8)
    }

    /// Floating point register from a 5-bit field
    pub const fn f(field: u32) -> Self {
        Register::F((field & 0x1f) as u8)
    }

    /// Vector register from a 5-bit field
    pub const fn v(field: u32) -> Self {
        Register::V((field & 0x1f) as u8)
    }

    pub const fn index(&self) -> u8 {
        match self {
            Register::X(n) | Register::F(n) | Register::V(n) => *n,
        }
    }

    /// `x0` reads as zero and ignores writes
    pub const fn is_zero(&self) -> bool {
        matches!(self, Register::X(0))
    }

    /// Name used in disassembly: the ABI alias for integer registers, the plain
    /// name otherwise
    pub fn abi_name(&self) -> Cow<'static, str> {
        match self {
            Register::X(n) => Cow::Borrowed(ABI_NAMES[*n as usize & 0x1f]),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::X(n) => write!(f, "x{n}"),
            Register::F(n) => write!(f, "f{n}"),
            Register::V(n) => write!(f, "v{n}"),
        }
    }
}

impl From<Register> for String {
    fn from(register: Register) -> Self {
        register.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown register name: '{0}'")]
pub struct ParseRegisterError(pub String);

impl FromStr for Register {
    type Err = ParseRegisterError;

    /// Accepts `x5`, `v3`, `f1` and the integer ABI aliases (`a5`, `sp`, `fp`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if let Some(index) = ABI_NAMES.iter().position(|abi| *abi == name) {
            return Ok(Register::X(index as u8));
        }
        if name == "fp" {
            return Ok(Register::X(8));
        }

        let err = || ParseRegisterError(s.to_string());
        let (kind, digits) = name.split_at_checked(1).ok_or_else(err)?;
        let index: u8 = digits.parse().map_err(|_| err())?;
        if index > 31 {
            return Err(err());
        }
        match kind {
            "x" => Ok(Register::X(index)),
            "f" => Ok(Register::F(index)),
            "v" => Ok(Register::V(index)),
            _ => Err(err()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abi_names() {
        assert_eq!(Register::X(0).abi_name(), "zero");
        assert_eq!(Register::X(5).abi_name(), "t0");
        assert_eq!(Register::X(8).abi_name(), "s0");
        assert_eq!(Register::X(15).abi_name(), "a5");
        assert_eq!(Register::X(18).abi_name(), "s2");
        assert_eq!(Register::X(27).abi_name(), "s11");
        assert_eq!(Register::X(31).abi_name(), "t6");
        assert_eq!(Register::V(4).abi_name(), "v4");
    }

    #[test]
    fn test_parse_register() {
        assert_eq!("a5".parse::<Register>().unwrap(), Register::X(15));
        assert_eq!("x31".parse::<Register>().unwrap(), Register::X(31));
        assert_eq!("v0".parse::<Register>().unwrap(), Register::V(0));
        assert_eq!("fp".parse::<Register>().unwrap(), Register::X(8));
        assert!("x32".parse::<Register>().is_err());
        assert!("q1".parse::<Register>().is_err());
        assert!("".parse::<Register>().is_err());
    }
}
