//! RVC compressed instructions for RV32
//!
//! Each quadrant has one handler. Floating point forms are left to an extension that
//! does not exist here and fall out as unsupported.
use crate::{
    bitfield::FieldExtractor,
    error::DecodeError,
    format::{
        CaFormat, CbFormat, CiFormat, CiwFormat, CjFormat, ClFormat, CrFormat, CsFormat,
        CssFormat, Format,
    },
    instruction::{ControlFlow, Instruction},
    isa::{DecodeFn, Extension, InstructionSet, OpcodeKey},
    register::Register,
};

pub struct Compressed;

const TABLE: &[(OpcodeKey, DecodeFn)] = &[
    (OpcodeKey::Compressed(0b00), decode_quadrant0),
    (OpcodeKey::Compressed(0b01), decode_quadrant1),
    (OpcodeKey::Compressed(0b10), decode_quadrant2),
];

impl InstructionSet for Compressed {
    fn extension(&self) -> Extension {
        Extension::C
    }

    fn opcode_table(&self) -> &'static [(OpcodeKey, DecodeFn)] {
        TABLE
    }
}

/// Stack-relative immediate, loads and stores
fn decode_quadrant0(word: u32) -> Result<Option<Instruction>, DecodeError> {
    if word & 0xFFFF == 0 {
        return Err(DecodeError::Illegal);
    }

    let instruction = match word.compressed_funct3() {
        0b000 => {
            let ciw = CiwFormat::parse(word);
            if ciw.imm == 0 {
                return Err(DecodeError::Reserved);
            }
            Instruction::new("c.addi4spn", Format::CIW, word)
                .dest(ciw.rd)
                .src(Register::SP)
                .imm(ciw.imm)
        }
        0b010 => {
            let cl = ClFormat::parse(word);
            Instruction::new("c.lw", Format::CL, word)
                .dest(cl.rd)
                .src(cl.rs1)
                .imm(cl.offset)
                .memory()
        }
        0b100 => return Err(DecodeError::Reserved),
        0b110 => {
            let cs = CsFormat::parse(word);
            Instruction::new("c.sw", Format::CS, word)
                .src(cs.rs1)
                .src(cs.rs2)
                .imm(cs.offset)
                .memory()
        }
        // c.fld, c.flw, c.fsd, c.fsw
        _ => return Ok(None),
    };
    Ok(Some(instruction))
}

/// Immediate arithmetic, jumps and branches
fn decode_quadrant1(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let instruction = match word.compressed_funct3() {
        0b000 => {
            let ci = CiFormat::parse(word);
            if ci.rd_rs1 == 0 {
                Instruction::new("c.nop", Format::CI, word)
            } else {
                let rd = Register::x(ci.rd_rs1);
                Instruction::new("c.addi", Format::CI, word).dest(rd).src(rd).imm(ci.imm)
            }
        }
        0b001 => {
            let cj = CjFormat::parse(word);
            Instruction::new("c.jal", Format::CJ, word)
                .dest(Register::RA)
                .imm(cj.offset)
                .control(ControlFlow::Direct)
        }
        0b010 => {
            let ci = CiFormat::parse(word);
            Instruction::new("c.li", Format::CI, word).dest(Register::x(ci.rd_rs1)).imm(ci.imm)
        }
        0b011 => decode_lui_addi16sp(word)?,
        0b100 => decode_arithmetic(word)?,
        0b101 => {
            let cj = CjFormat::parse(word);
            Instruction::new("c.j", Format::CJ, word).imm(cj.offset).control(ControlFlow::Direct)
        }
        funct3 => {
            let cb = CbFormat::parse(word);
            let name = if funct3 == 0b110 { "c.beqz" } else { "c.bnez" };
            Instruction::new(name, Format::CB, word)
                .src(cb.rs1)
                .imm(cb.offset)
                .control(ControlFlow::Direct)
        }
    };
    Ok(Some(instruction))
}

fn decode_lui_addi16sp(word: u32) -> Result<Instruction, DecodeError> {
    let ci = CiFormat::parse(word);
    match ci.rd_rs1 {
        2 => {
            let imm = ci.addi16sp_imm();
            if imm == 0 {
                return Err(DecodeError::Reserved);
            }
            Ok(Instruction::new("c.addi16sp", Format::CI, word)
                .dest(Register::SP)
                .src(Register::SP)
                .imm(imm))
        }
        0 => Err(DecodeError::LuiZeroDestination),
        rd => {
            if ci.lui_imm() == 0 {
                return Err(DecodeError::Reserved);
            }
            Ok(Instruction::new("c.lui", Format::CI, word).dest(Register::x(rd)).imm(ci.lui_imm()))
        }
    }
}

/// The funct3 = 100 group: shifts and andi on CB, register ops on CA
fn decode_arithmetic(word: u32) -> Result<Instruction, DecodeError> {
    let cb = CbFormat::parse(word);
    let rd = cb.rs1;
    match cb.funct2 {
        0b00 | 0b01 => {
            let shamt = cb.ci().shamt();
            // shamt[5] must be zero on RV32
            if shamt & 0b10_0000 != 0 {
                return Err(DecodeError::Reserved);
            }
            let name = if cb.funct2 == 0b00 { "c.srli" } else { "c.srai" };
            Ok(Instruction::new(name, Format::CB, word).dest(rd).src(rd).imm(shamt as i32))
        }
        0b10 => Ok(Instruction::new("c.andi", Format::CB, word).dest(rd).src(rd).imm(cb.ci().imm)),
        _ => {
            let ca = CaFormat::parse(word);
            if ca.funct1 != 0 {
                // c.subw and c.addw are RV64 only
                return Err(DecodeError::Reserved);
            }
            let name = match ca.funct2 {
                0b00 => "c.sub",
                0b01 => "c.xor",
                0b10 => "c.or",
                _ => "c.and",
            };
            Ok(Instruction::new(name, Format::CA, word).dest(ca.rd_rs1).src(ca.rd_rs1).src(ca.rs2))
        }
    }
}

/// Stack-pointer loads and stores, slli, and the jr/mv/ebreak/jalr/add group
fn decode_quadrant2(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let instruction = match word.compressed_funct3() {
        0b000 => {
            let ci = CiFormat::parse(word);
            let shamt = ci.shamt();
            if shamt & 0b10_0000 != 0 {
                return Err(DecodeError::Reserved);
            }
            let rd = Register::x(ci.rd_rs1);
            Instruction::new("c.slli", Format::CI, word).dest(rd).src(rd).imm(shamt as i32)
        }
        0b010 => {
            let ci = CiFormat::parse(word);
            if ci.rd_rs1 == 0 {
                return Err(DecodeError::Reserved);
            }
            Instruction::new("c.lwsp", Format::CI, word)
                .dest(Register::x(ci.rd_rs1))
                .src(Register::SP)
                .imm(ci.lwsp_offset())
                .memory()
        }
        0b100 => decode_jump_move_add(word)?,
        0b110 => {
            let css = CssFormat::parse(word);
            Instruction::new("c.swsp", Format::CSS, word)
                .src(Register::SP)
                .src(Register::x(css.rs2))
                .imm(css.offset)
                .memory()
        }
        // c.fldsp, c.flwsp, c.fsdsp, c.fswsp
        _ => return Ok(None),
    };
    Ok(Some(instruction))
}

fn decode_jump_move_add(word: u32) -> Result<Instruction, DecodeError> {
    let cr = CrFormat::parse(word);
    let rd = Register::x(cr.rd_rs1);
    let rs2 = Register::x(cr.rs2);
    let instruction = match (cr.funct1, cr.rd_rs1, cr.rs2) {
        (0, 0, 0) => return Err(DecodeError::Reserved),
        (0, _, 0) => {
            Instruction::new("c.jr", Format::CR, word).src(rd).control(ControlFlow::Indirect)
        }
        (0, _, _) => Instruction::new("c.mv", Format::CR, word).dest(rd).src(rs2),
        (_, 0, 0) => Instruction::new("c.ebreak", Format::CR, word).control(ControlFlow::Indirect),
        (_, _, 0) => Instruction::new("c.jalr", Format::CR, word)
            .dest(Register::RA)
            .src(rd)
            .control(ControlFlow::Indirect),
        _ => Instruction::new("c.add", Format::CR, word).dest(rd).src(rd).src(rs2),
    };
    Ok(instruction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrant0_all_zero_is_illegal() {
        assert_eq!(decode_quadrant0(0x0000), Err(DecodeError::Illegal));
    }

    #[test]
    fn test_quadrant0_float_forms_pass() {
        // c.fld fs0, 0(a0)
        assert_eq!(decode_quadrant0(0x2100), Ok(None));
    }

    #[test]
    fn test_lui_zero_destination() {
        // c.lui x0, 1
        assert_eq!(decode_quadrant1(0x6005), Err(DecodeError::LuiZeroDestination));
        // c.lui a0, 0
        assert_eq!(decode_quadrant1(0x6501), Err(DecodeError::Reserved));
    }
}
