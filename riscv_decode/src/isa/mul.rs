//! RV32M multiply/divide
use crate::{
    error::DecodeError,
    format::{Format, RType},
    instruction::Instruction,
    isa::{DecodeFn, Extension, InstructionSet, Opcode, OpcodeKey},
    register::Register,
};

const MULDIV: u32 = 0b000_0001;

pub struct Multiply;

const TABLE: &[(OpcodeKey, DecodeFn)] = &[(OpcodeKey::Standard(Opcode::Op), decode_muldiv)];

impl InstructionSet for Multiply {
    fn extension(&self) -> Extension {
        Extension::M
    }

    fn opcode_table(&self) -> &'static [(OpcodeKey, DecodeFn)] {
        TABLE
    }
}

fn decode_muldiv(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let r = RType::parse(word);
    if r.funct7 != MULDIV {
        return Ok(None);
    }
    let name = match r.funct3 {
        0b000 => "mul",
        0b001 => "mulh",
        0b010 => "mulhsu",
        0b011 => "mulhu",
        0b100 => "div",
        0b101 => "divu",
        0b110 => "rem",
        _ => "remu",
    };
    Ok(Some(
        Instruction::new(name, Format::R, word)
            .dest(Register::x(r.rd))
            .src(Register::x(r.rs1))
            .src(Register::x(r.rs2)),
    ))
}
