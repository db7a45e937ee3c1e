//! Canonical disassembly text
//!
//! `mnemonic dest,src,imm` with ABI register names. Scalar memory accesses use the
//! `offset(base)` form and vector memory accesses put the base register in
//! parentheses, as the standard assemblers print them.
use std::fmt;

use itertools::Itertools;

use crate::{
    format::Format,
    instruction::{Instruction, InstructionClass},
    register::Register,
};

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands = match self.format() {
            Format::VAMO => vector_amo_operands(self),
            format if format.is_vector_memory() => vector_memory_operands(self),
            _ if is_scalar_memory(self) => scalar_memory_operands(self),
            _ => plain_operands(self),
        };

        if operands.is_empty() {
            write!(f, "{}", self.mnemonic())
        } else {
            write!(f, "{} {}", self.mnemonic(), operands.join(","))
        }
    }
}

fn is_scalar_memory(instruction: &Instruction) -> bool {
    instruction.class() == InstructionClass::Memory
        && !instruction.src_registers().is_empty()
        && !instruction.immediates().is_empty()
}

fn names(registers: &[Register]) -> impl Iterator<Item = String> + '_ {
    registers.iter().map(|register| register.abi_name().into_owned())
}

fn mask_operand(instruction: &Instruction) -> Option<String> {
    instruction.mask().map(|mask| mask.to_string())
}

fn plain_operands(instruction: &Instruction) -> Vec<String> {
    names(instruction.dest_registers())
        .chain(names(instruction.src_registers()))
        .chain(instruction.immediates().iter().map(|imm| imm.to_string()))
        .chain(mask_operand(instruction))
        .collect()
}

/// `lw a0,4(sp)` and `sw a1,-4(sp)`
fn scalar_memory_operands(instruction: &Instruction) -> Vec<String> {
    let src = instruction.src_registers();
    let offset = instruction.immediates()[0];
    let base = src[0].abi_name();
    let value = match instruction.dest_registers().first() {
        Some(dest) => dest.abi_name().into_owned(),
        None => src.get(1).map(|rs2| rs2.abi_name().into_owned()).unwrap_or_default(),
    };
    vec![value, format!("{offset}({base})")]
}

/// `vlse.v v1,(a0),a1` and `vse.v v3,(a0)`
fn vector_memory_operands(instruction: &Instruction) -> Vec<String> {
    let src = instruction.src_registers();
    let Some((base, rest)) = src.split_first() else {
        return plain_operands(instruction);
    };

    let (data, stride) = match instruction.dest_registers().first() {
        Some(vd) => (*vd, rest),
        None => match rest.split_last() {
            Some((vs3, stride)) => (*vs3, stride),
            None => return plain_operands(instruction),
        },
    };

    std::iter::once(data.abi_name().into_owned())
        .chain(std::iter::once(format!("({})", base.abi_name())))
        .chain(names(stride))
        .chain(mask_operand(instruction))
        .collect()
}

/// `vamoaddw.v v4,(a0),v8,v4`, with `x0` in front when the old value is discarded
fn vector_amo_operands(instruction: &Instruction) -> Vec<String> {
    let src = instruction.src_registers();
    let [base, vs2, vd] = src else {
        return plain_operands(instruction);
    };

    let returned = match instruction.dest_registers().first() {
        Some(dest) => dest.abi_name().into_owned(),
        None => Register::ZERO.to_string(),
    };

    [returned, format!("({})", base.abi_name())]
        .into_iter()
        .chain([vs2.abi_name().into_owned(), vd.abi_name().into_owned()])
        .chain(mask_operand(instruction))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{ControlFlow, Mask};

    #[test]
    fn test_render_register_register() {
        let add = Instruction::new("add", Format::R, 0x00e7_87b3)
            .dest(Register::X(15))
            .src(Register::X(15))
            .src(Register::X(14));
        assert_eq!(add.to_string(), "add a5,a5,a4");
    }

    #[test]
    fn test_render_no_operands() {
        let nop = Instruction::new("c.nop", Format::CI, 0x0001);
        assert_eq!(nop.to_string(), "c.nop");
        let ecall =
            Instruction::new("ecall", Format::I, 0x0000_0073).control(ControlFlow::Indirect);
        assert_eq!(ecall.to_string(), "ecall");
    }

    #[test]
    fn test_render_memory_offsets() {
        let lw = Instruction::new("lw", Format::I, 0x0041_2503)
            .dest(Register::X(10))
            .src(Register::SP)
            .imm(4)
            .memory();
        assert_eq!(lw.to_string(), "lw a0,4(sp)");

        let sw = Instruction::new("sw", Format::S, 0xFEB1_2E23)
            .src(Register::SP)
            .src(Register::X(11))
            .imm(-4)
            .memory();
        assert_eq!(sw.to_string(), "sw a1,-4(sp)");
    }

    #[test]
    fn test_render_vector_memory() {
        let load = Instruction::new("vlse.v", Format::VLS, 0x0805_7087)
            .dest(Register::V(1))
            .src(Register::X(10))
            .src(Register::X(11))
            .with_mask(Some(Mask::V0True))
            .memory();
        assert_eq!(load.to_string(), "vlse.v v1,(a0),a1,v0.t");

        let store = Instruction::new("vse.v", Format::VS, 0x0205_71a7)
            .src(Register::X(10))
            .src(Register::V(3))
            .memory();
        assert_eq!(store.to_string(), "vse.v v3,(a0)");
    }
}
