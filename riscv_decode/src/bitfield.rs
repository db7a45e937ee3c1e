//! Bit-field extraction shared by every format parser
//!
//! Positions are LSB-indexed as in the RISC-V manuals: bit 0 is the least
//! significant bit of the instruction word. Compressed words are carried in the
//! low 16 bits of a `u32`.
use crate::register::Register;

/// Bit masks for field extraction
pub(crate) const MASK1: u32 = 0b1; // 1-bit mask
pub(crate) const MASK2: u32 = 0b11; // 2-bit mask
pub(crate) const MASK3: u32 = 0b111; // 3-bit mask
pub(crate) const MASK4: u32 = 0b1111; // 4-bit mask
pub(crate) const MASK5: u32 = 0b1_1111; // 5-bit mask
pub(crate) const MASK6: u32 = 0b11_1111; // 6-bit mask
pub(crate) const MASK7: u32 = 0b111_1111; // 7-bit mask
pub(crate) const MASK8: u32 = 0b1111_1111; // 8-bit mask
pub(crate) const MASK10: u32 = 0b11_1111_1111; // 10-bit mask
pub(crate) const MASK11: u32 = 0b111_1111_1111; // 11-bit mask
pub(crate) const MASK12: u32 = 0b1111_1111_1111; // 12-bit mask

/// x8..x15, indexed by the 3-bit register fields of the CIW/CL/CS/CA/CB formats
pub const COMPRESSED_REGISTERS: [Register; 8] = [
    Register::X(8),
    Register::X(9),
    Register::X(10),
    Register::X(11),
    Register::X(12),
    Register::X(13),
    Register::X(14),
    Register::X(15),
];

/// Extract `width` bits of `word` starting at bit `lo`
#[inline(always)]
pub const fn bits(word: u32, lo: u32, width: u32) -> u32 {
    (word >> lo) & (u32::MAX >> (32 - width))
}

/// Sign-extend the low `width` bits of `value`
///
/// Equivalent to reading the field as unsigned and subtracting `2^width` when its
/// top bit is set.
#[inline(always)]
pub const fn sign_extend(value: u32, width: u32) -> i32 {
    let shift = 32 - width;
    ((value << shift) as i32) >> shift
}

/// Look up the full register named by a 3-bit compressed register field
#[inline(always)]
pub const fn compressed_register(field: u32) -> Register {
    COMPRESSED_REGISTERS[(field & MASK3) as usize]
}

/// Dispatch fields read before the format of a word is known
pub trait FieldExtractor {
    /// Extract opcode (bits [6:0])
    fn opcode(&self) -> u8;

    /// Extract compressed quadrant (bits [1:0])
    fn quadrant(&self) -> u8;

    /// Extract compressed funct3 (bits [15:13])
    fn compressed_funct3(&self) -> u8;
}

impl FieldExtractor for u32 {
    fn opcode(&self) -> u8 {
        (*self & MASK7) as u8
    }

    fn quadrant(&self) -> u8 {
        (*self & MASK2) as u8
    }

    fn compressed_funct3(&self) -> u8 {
        bits(*self, 13, 3) as u8
    }
}
