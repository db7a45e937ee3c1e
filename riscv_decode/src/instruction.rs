//! The decoded instruction value
use std::fmt;

use serde::Serialize;

use crate::{format::Format, register::Register};

/// Encoded length of an instruction
///
/// Determined solely by the low two bits of the word: `11` means a 32-bit
/// standard encoding, anything else a 16-bit compressed one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum InstructionSize {
    /// 16-bit compressed instruction
    Compressed,
    /// 32-bit standard instruction
    Standard,
}

impl InstructionSize {
    #[inline(always)]
    pub const fn of(word: u32) -> Self {
        if word & 0b11 == 0b11 {
            InstructionSize::Standard
        } else {
            InstructionSize::Compressed
        }
    }

    pub const fn bits(&self) -> u32 {
        match self {
            InstructionSize::Compressed => 16,
            InstructionSize::Standard => 32,
        }
    }

    pub const fn bytes(&self) -> u32 {
        self.bits() / 8
    }
}

impl fmt::Display for InstructionSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// How an instruction can leave its basic block
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ControlFlow {
    /// Target is the instruction address plus the first immediate
    Direct,
    /// Target comes from a register or the environment (jalr, ecall, ...)
    Indirect,
}

/// Coarse classification used to cut basic blocks into sub-blocks
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum InstructionClass {
    Arithmetic,
    Memory,
    Control(ControlFlow),
}

/// Vector mask operand
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Mask {
    /// Element-wise predicate, rendered `v0.t`
    V0True,
    /// Carry-in or merge selector, rendered `v0`
    V0,
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mask::V0True => write!(f, "v0.t"),
            Mask::V0 => write!(f, "v0"),
        }
    }
}

/// Element width of a vector memory access
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ElementWidth {
    Byte,
    Half,
    Word,
    /// The width currently selected by `vtype.vsew`
    Sew,
}

impl ElementWidth {
    pub const fn suffix(&self) -> &'static str {
        match self {
            ElementWidth::Byte => "b",
            ElementWidth::Half => "h",
            ElementWidth::Word => "w",
            ElementWidth::Sew => "e",
        }
    }
}

/// Width and sign qualifier of a vector memory access
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VectorWidth {
    pub element: ElementWidth,
    /// Zero-extending load
    pub unsigned: bool,
}

/// A decoded instruction
///
/// Immutable once built. Operand order is the canonical disassembly order:
/// `dest_registers` first, then `src_registers`, then `immediates`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Instruction {
    mnemonic: String,
    format: Format,
    src_registers: Vec<Register>,
    dest_registers: Vec<Register>,
    immediates: Vec<i32>,
    mask: Option<Mask>,
    width: Option<VectorWidth>,
    nf: Option<u8>,
    size: InstructionSize,
    raw: u32,
    class: InstructionClass,
}

impl Instruction {
    /// Start an arithmetic instruction with no operands
    pub(crate) fn new(mnemonic: impl Into<String>, format: Format, raw: u32) -> Self {
        let size = InstructionSize::of(raw);
        let raw = match size {
            InstructionSize::Compressed => raw & 0xFFFF,
            InstructionSize::Standard => raw,
        };
        Self {
            mnemonic: mnemonic.into(),
            format,
            src_registers: Vec::new(),
            dest_registers: Vec::new(),
            immediates: Vec::new(),
            mask: None,
            width: None,
            nf: None,
            size,
            raw,
            class: InstructionClass::Arithmetic,
        }
    }

    pub(crate) fn dest(mut self, register: Register) -> Self {
        self.dest_registers.push(register);
        self
    }

    pub(crate) fn src(mut self, register: Register) -> Self {
        self.src_registers.push(register);
        self
    }

    pub(crate) fn imm(mut self, value: i32) -> Self {
        self.immediates.push(value);
        self
    }

    pub(crate) fn with_mask(mut self, mask: Option<Mask>) -> Self {
        self.mask = mask;
        self
    }

    pub(crate) fn with_width(mut self, width: VectorWidth) -> Self {
        self.width = Some(width);
        self
    }

    pub(crate) fn with_segments(mut self, nf: Option<u8>) -> Self {
        self.nf = nf;
        self
    }

    pub(crate) fn memory(mut self) -> Self {
        self.class = InstructionClass::Memory;
        self
    }

    pub(crate) fn control(mut self, flow: ControlFlow) -> Self {
        self.class = InstructionClass::Control(flow);
        self
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn src_registers(&self) -> &[Register] {
        &self.src_registers
    }

    pub fn dest_registers(&self) -> &[Register] {
        &self.dest_registers
    }

    pub fn immediates(&self) -> &[i32] {
        &self.immediates
    }

    pub fn mask(&self) -> Option<Mask> {
        self.mask
    }

    pub fn width(&self) -> Option<VectorWidth> {
        self.width
    }

    /// Segment count of a vector segment load/store, when more than one
    pub fn nf(&self) -> Option<u8> {
        self.nf
    }

    pub fn size(&self) -> InstructionSize {
        self.size
    }

    /// The original bit pattern, truncated to 16 bits for compressed encodings
    pub fn raw(&self) -> u32 {
        self.raw
    }

    pub fn class(&self) -> InstructionClass {
        self.class
    }

    pub fn is_control_transfer(&self) -> bool {
        matches!(self.class, InstructionClass::Control(_))
    }

    pub fn is_memory_access(&self) -> bool {
        self.class == InstructionClass::Memory
    }

    /// Statically known target of a PC-relative branch or jump at `pc`
    pub fn branch_target(&self, pc: u32) -> Option<u32> {
        match self.class {
            InstructionClass::Control(ControlFlow::Direct) => {
                let offset = *self.immediates.first()?;
                Some(pc.wrapping_add_signed(offset))
            }
            _ => None,
        }
    }

    /// `auipc` reads the program counter as an implicit input
    pub fn reads_pc(&self) -> bool {
        self.mnemonic == "auipc"
    }

    /// Register-to-register copy: `c.mv`, `addi rd, rs, 0` with `rs` not `x0`, and the
    /// vector `vmv` forms
    pub fn is_move(&self) -> bool {
        match self.mnemonic.as_str() {
            "c.mv" | "vmv.v.v" | "vmv.v.x" | "vmv.v.i" | "vmv.x.s" | "vmv.s.x" => true,
            "addi" => {
                self.immediates == [0] && self.src_registers.first().is_some_and(|r| !r.is_zero())
            }
            _ => false,
        }
    }

    /// Integer multiplies, scalar or vector
    pub fn is_multiply(&self) -> bool {
        let name = self.mnemonic.as_str();
        name.starts_with("mul") || name.starts_with("vmul") || name.starts_with("vwmul")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_from_low_bits() {
        assert_eq!(InstructionSize::of(0x00e7_87b3), InstructionSize::Standard);
        assert_eq!(InstructionSize::of(0x0001), InstructionSize::Compressed);
        assert_eq!(InstructionSize::of(0x0002), InstructionSize::Compressed);
        assert_eq!(InstructionSize::of(0x0000), InstructionSize::Compressed);
        assert_eq!(InstructionSize::Compressed.bytes(), 2);
        assert_eq!(InstructionSize::Standard.bits(), 32);
    }

    #[test]
    fn test_branch_target() {
        let beq = Instruction::new("beq", Format::B, 0x0000_0063)
            .src(Register::X(10))
            .src(Register::X(11))
            .imm(-8)
            .control(ControlFlow::Direct);
        assert_eq!(beq.branch_target(0x100), Some(0xF8));

        let jalr = Instruction::new("jalr", Format::I, 0x0000_8067)
            .dest(Register::ZERO)
            .src(Register::RA)
            .imm(0)
            .control(ControlFlow::Indirect);
        assert_eq!(jalr.branch_target(0x100), None);
        assert!(jalr.is_control_transfer());
    }

    #[test]
    fn test_move_detection() {
        let mv = Instruction::new("addi", Format::I, 0x0005_0593)
            .dest(Register::X(11))
            .src(Register::X(10))
            .imm(0);
        assert!(mv.is_move());
        let addi = Instruction::new("addi", Format::I, 0x0015_0593)
            .dest(Register::X(11))
            .src(Register::X(10))
            .imm(1);
        assert!(!addi.is_move());
        // li a0,0 materializes a constant
        let li = Instruction::new("addi", Format::I, 0x0000_0513)
            .dest(Register::X(10))
            .src(Register::ZERO)
            .imm(0);
        assert!(!li.is_move());
    }
}
