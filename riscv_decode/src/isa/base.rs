//! RV32I base integer instructions
use crate::{
    error::DecodeError,
    format::{BType, Format, IType, JType, RType, SType, UType},
    instruction::{ControlFlow, Instruction},
    isa::{DecodeFn, Extension, InstructionSet, Opcode, OpcodeKey},
    register::Register,
};

pub struct Base;

const TABLE: &[(OpcodeKey, DecodeFn)] = &[
    (OpcodeKey::Standard(Opcode::Lui), decode_lui),
    (OpcodeKey::Standard(Opcode::Auipc), decode_auipc),
    (OpcodeKey::Standard(Opcode::Jal), decode_jal),
    (OpcodeKey::Standard(Opcode::Jalr), decode_jalr),
    (OpcodeKey::Standard(Opcode::Branch), decode_branch),
    (OpcodeKey::Standard(Opcode::Load), decode_load),
    (OpcodeKey::Standard(Opcode::Store), decode_store),
    (OpcodeKey::Standard(Opcode::OpImm), decode_op_imm),
    (OpcodeKey::Standard(Opcode::Op), decode_op),
    (OpcodeKey::Standard(Opcode::System), decode_system),
    (OpcodeKey::Standard(Opcode::MiscMem), decode_fence),
];

impl InstructionSet for Base {
    fn extension(&self) -> Extension {
        Extension::I
    }

    fn opcode_table(&self) -> &'static [(OpcodeKey, DecodeFn)] {
        TABLE
    }
}

fn decode_lui(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let u = UType::parse(word);
    Ok(Some(Instruction::new("lui", Format::U, word).dest(Register::x(u.rd)).imm(u.imm)))
}

fn decode_auipc(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let u = UType::parse(word);
    Ok(Some(Instruction::new("auipc", Format::U, word).dest(Register::x(u.rd)).imm(u.imm)))
}

fn decode_jal(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let j = JType::parse(word);
    Ok(Some(
        Instruction::new("jal", Format::J, word)
            .dest(Register::x(j.rd))
            .imm(j.imm)
            .control(ControlFlow::Direct),
    ))
}

fn decode_jalr(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let i = IType::parse(word);
    if i.funct3 != 0 {
        return Ok(None);
    }
    Ok(Some(
        Instruction::new("jalr", Format::I, word)
            .dest(Register::x(i.rd))
            .src(Register::x(i.rs1))
            .imm(i.imm)
            .control(ControlFlow::Indirect),
    ))
}

fn decode_branch(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let b = BType::parse(word);
    let name = match b.funct3 {
        0b000 => "beq",
        0b001 => "bne",
        0b100 => "blt",
        0b101 => "bge",
        0b110 => "bltu",
        0b111 => "bgeu",
        _ => return Ok(None),
    };
    Ok(Some(
        Instruction::new(name, Format::B, word)
            .src(Register::x(b.rs1))
            .src(Register::x(b.rs2))
            .imm(b.imm)
            .control(ControlFlow::Direct),
    ))
}

fn decode_load(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let i = IType::parse(word);
    let name = match i.funct3 {
        0b000 => "lb",
        0b001 => "lh",
        0b010 => "lw",
        0b100 => "lbu",
        0b101 => "lhu",
        _ => return Ok(None),
    };
    Ok(Some(
        Instruction::new(name, Format::I, word)
            .dest(Register::x(i.rd))
            .src(Register::x(i.rs1))
            .imm(i.imm)
            .memory(),
    ))
}

fn decode_store(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let s = SType::parse(word);
    let name = match s.funct3 {
        0b000 => "sb",
        0b001 => "sh",
        0b010 => "sw",
        _ => return Ok(None),
    };
    Ok(Some(
        Instruction::new(name, Format::S, word)
            .src(Register::x(s.rs1))
            .src(Register::x(s.rs2))
            .imm(s.imm)
            .memory(),
    ))
}

fn decode_op_imm(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let i = IType::parse(word);
    let (name, imm) = match i.funct3 {
        0b000 => ("addi", i.imm),
        0b010 => ("slti", i.imm),
        0b011 => ("sltiu", i.imm),
        0b100 => ("xori", i.imm),
        0b110 => ("ori", i.imm),
        0b111 => ("andi", i.imm),
        0b001 => match i.imm_hi() {
            0b000_0000 => ("slli", i.shamt()),
            _ => return Ok(None),
        },
        // srli and srai differ only in imm[10]
        0b101 => match i.imm_hi() {
            0b000_0000 => ("srli", i.shamt()),
            0b010_0000 => ("srai", i.shamt()),
            _ => return Ok(None),
        },
        _ => return Ok(None),
    };
    Ok(Some(
        Instruction::new(name, Format::I, word)
            .dest(Register::x(i.rd))
            .src(Register::x(i.rs1))
            .imm(imm),
    ))
}

fn decode_op(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let r = RType::parse(word);
    let name = match (r.funct3, r.funct7) {
        (0b000, 0b000_0000) => "add",
        (0b000, 0b010_0000) => "sub",
        (0b001, 0b000_0000) => "sll",
        (0b010, 0b000_0000) => "slt",
        (0b011, 0b000_0000) => "sltu",
        (0b100, 0b000_0000) => "xor",
        (0b101, 0b000_0000) => "srl",
        (0b101, 0b010_0000) => "sra",
        (0b110, 0b000_0000) => "or",
        (0b111, 0b000_0000) => "and",
        // funct7 = 1 is the M extension
        _ => return Ok(None),
    };
    Ok(Some(
        Instruction::new(name, Format::R, word)
            .dest(Register::x(r.rd))
            .src(Register::x(r.rs1))
            .src(Register::x(r.rs2)),
    ))
}

fn decode_system(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let i = IType::parse(word);
    if i.funct3 != 0 {
        // CSR access
        return Ok(None);
    }
    let name = if i.imm == 0 { "ecall" } else { "ebreak" };
    Ok(Some(Instruction::new(name, Format::I, word).control(ControlFlow::Indirect)))
}

fn decode_fence(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let name = match IType::parse(word).funct3 {
        0b000 => "fence",
        0b001 => "fence.i",
        _ => return Ok(None),
    };
    Ok(Some(Instruction::new(name, Format::I, word).memory()))
}
