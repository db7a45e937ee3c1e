//! RVV vector instructions: loads, stores, vector AMOs, OP-V and the vset family
//!
//! Mnemonics follow the v0.8 vector draft (`vlbu.v`, `vsx`, `vamoaddw.v`, `vpopc.m`).
use crate::{
    error::DecodeError,
    format::{Format, OpVFormat, VAmoFormat, VMemFormat, VSetFormat},
    instruction::{ElementWidth, Instruction, Mask, VectorWidth},
    isa::{DecodeFn, Extension, InstructionSet, Opcode, OpcodeKey},
    register::Register,
};

pub struct Vector;

const TABLE: &[(OpcodeKey, DecodeFn)] = &[
    (OpcodeKey::Standard(Opcode::LoadFp), decode_load),
    (OpcodeKey::Standard(Opcode::StoreFp), decode_store),
    (OpcodeKey::Standard(Opcode::Amo), decode_amo),
    (OpcodeKey::Standard(Opcode::OpV), decode_op_v),
];

impl InstructionSet for Vector {
    fn extension(&self) -> Extension {
        Extension::V
    }

    fn opcode_table(&self) -> &'static [(OpcodeKey, DecodeFn)] {
        TABLE
    }
}

/// Unit-stride lumop selecting fault-only-first loads
const LUMOP_FAULT_FIRST: u32 = 0b1_0000;

fn element_width(width: u32) -> Option<ElementWidth> {
    match width {
        0b000 => Some(ElementWidth::Byte),
        0b101 => Some(ElementWidth::Half),
        0b110 => Some(ElementWidth::Word),
        0b111 => Some(ElementWidth::Sew),
        // scalar floating point widths
        _ => None,
    }
}

fn mask(vm: u32) -> Option<Mask> {
    (vm == 0).then_some(Mask::V0True)
}

fn segments(nf: u32) -> (Option<u8>, String) {
    match nf {
        0 => (None, String::new()),
        nf => (Some(nf as u8 + 1), format!("seg{}", nf + 1)),
    }
}

fn decode_load(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let m = VMemFormat::parse(word);
    let Some(element) = element_width(m.width) else {
        return Ok(None);
    };

    let (prefix, format) = match m.mop {
        0b000 | 0b100 => ("vl", Format::VL),
        0b010 | 0b110 => ("vls", Format::VLS),
        0b011 | 0b111 => ("vlx", Format::VLX),
        _ => return Err(DecodeError::Reserved),
    };
    let unsigned = matches!(m.mop, 0b000 | 0b010 | 0b011) && element != ElementWidth::Sew;
    let fault_first = match (format, m.rs2) {
        (Format::VL, 0) => false,
        (Format::VL, LUMOP_FAULT_FIRST) => true,
        (Format::VL, _) => return Err(DecodeError::Reserved),
        _ => false,
    };
    let (nf, seg) = segments(m.nf);

    let name = format!(
        "{prefix}{seg}{}{}{}.v",
        element.suffix(),
        if unsigned { "u" } else { "" },
        if fault_first { "ff" } else { "" }
    );
    let instruction =
        Instruction::new(name, format, word).dest(Register::v(m.vd)).src(Register::x(m.rs1));
    let instruction = match format {
        Format::VLS => instruction.src(Register::x(m.rs2)),
        Format::VLX => instruction.src(Register::v(m.rs2)),
        _ => instruction,
    };
    Ok(Some(
        instruction
            .with_mask(mask(m.vm))
            .with_width(VectorWidth { element, unsigned })
            .with_segments(nf)
            .memory(),
    ))
}

fn decode_store(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let m = VMemFormat::parse(word);
    let Some(element) = element_width(m.width) else {
        return Ok(None);
    };

    let (prefix, format) = match m.mop {
        0b000 if m.rs2 == 0 => ("vs", Format::VS),
        0b010 => ("vss", Format::VSS),
        0b011 => ("vsx", Format::VSX),
        0b111 => ("vsux", Format::VSX),
        _ => return Err(DecodeError::Reserved),
    };
    let (nf, seg) = segments(m.nf);

    let name = format!("{prefix}{seg}{}.v", element.suffix());
    let instruction = Instruction::new(name, format, word).src(Register::x(m.rs1));
    let instruction = match format {
        Format::VSS => instruction.src(Register::x(m.rs2)),
        Format::VSX => instruction.src(Register::v(m.rs2)),
        _ => instruction,
    };
    Ok(Some(
        instruction
            .src(Register::v(m.vd))
            .with_mask(mask(m.vm))
            .with_width(VectorWidth { element, unsigned: false })
            .with_segments(nf)
            .memory(),
    ))
}

fn decode_amo(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let amo = VAmoFormat::parse(word);
    let element = match amo.width {
        0b110 => ElementWidth::Word,
        0b111 => ElementWidth::Sew,
        // scalar A extension
        _ => return Ok(None),
    };
    let op = match amo.amoop {
        0b00000 => "add",
        0b00001 => "swap",
        0b00100 => "xor",
        0b01000 => "or",
        0b01100 => "and",
        0b10000 => "min",
        0b10100 => "max",
        0b11000 => "minu",
        0b11100 => "maxu",
        _ => return Err(DecodeError::Reserved),
    };

    let name = format!("vamo{op}{}.v", element.suffix());
    let mut instruction = Instruction::new(name, Format::VAMO, word)
        .src(Register::x(amo.rs1))
        .src(Register::v(amo.vs2))
        .src(Register::v(amo.vd));
    if amo.wd == 1 {
        instruction = instruction.dest(Register::v(amo.vd));
    }
    Ok(Some(
        instruction
            .with_mask(mask(amo.vm))
            .with_width(VectorWidth { element, unsigned: false })
            .memory(),
    ))
}

/// Operation group selected by the OP-V funct3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Opi,
    Opm,
    Opf,
}

/// Shape of the vs1/rs1/imm operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Vector,
    Scalar,
    Float,
    Immediate,
}

// Allowed operand shapes of a table entry
const V: u8 = 0b001;
const X: u8 = 0b010;
const I: u8 = 0b100;
const F: u8 = X;
const VX: u8 = V | X;
const XI: u8 = X | I;
const VXI: u8 = V | X | I;
const VF: u8 = V | F;

impl Operand {
    const fn shape(self) -> u8 {
        match self {
            Operand::Vector => V,
            Operand::Scalar | Operand::Float => X,
            Operand::Immediate => I,
        }
    }

    const fn letter(self) -> char {
        match self {
            Operand::Vector => 'v',
            Operand::Scalar => 'x',
            Operand::Float => 'f',
            Operand::Immediate => 'i',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix {
    /// `.vv`, `.vx`, `.vi`, `.vf`
    Plain,
    /// `.vs`
    Reduction,
    /// `.wv`, `.wx`, `.wi`, `.wf`: vs2 is double width
    Wide,
    /// `.mm`
    MaskLogical,
    /// `.vm`
    Compress,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    name: &'static str,
    shapes: u8,
    suffix: Suffix,
    /// Multiply-add forms print vs1/rs1 before vs2
    fused: bool,
    unsigned_imm: bool,
}

const fn op(name: &'static str, shapes: u8) -> Entry {
    Entry { name, shapes, suffix: Suffix::Plain, fused: false, unsigned_imm: false }
}

impl Entry {
    const fn suffix(mut self, suffix: Suffix) -> Self {
        self.suffix = suffix;
        self
    }

    const fn fused(mut self) -> Self {
        self.fused = true;
        self
    }

    const fn unsigned_imm(mut self) -> Self {
        self.unsigned_imm = true;
        self
    }
}

const INTEGER_REDUCTIONS: [&str; 8] =
    ["vredsum", "vredand", "vredor", "vredxor", "vredminu", "vredmin", "vredmaxu", "vredmax"];

const MASK_LOGICAL: [&str; 8] =
    ["vmandnot", "vmand", "vmor", "vmxor", "vmornot", "vmnand", "vmnor", "vmxnor"];

const FLOAT_FUSED: [&str; 8] =
    ["vfmadd", "vfnmadd", "vfmsub", "vfnmsub", "vfmacc", "vfnmacc", "vfmsac", "vfnmsac"];

const FLOAT_WIDENING_FUSED: [&str; 4] = ["vfwmacc", "vfwnmacc", "vfwmsac", "vfwnmsac"];

fn opi(funct6: u32) -> Option<Entry> {
    let entry = match funct6 {
        0x00 => op("vadd", VXI),
        0x02 => op("vsub", VX),
        0x03 => op("vrsub", XI),
        0x04 => op("vminu", VX),
        0x05 => op("vmin", VX),
        0x06 => op("vmaxu", VX),
        0x07 => op("vmax", VX),
        0x09 => op("vand", VXI),
        0x0A => op("vor", VXI),
        0x0B => op("vxor", VXI),
        0x0C => op("vrgather", VXI).unsigned_imm(),
        0x0E => op("vslideup", XI).unsigned_imm(),
        0x0F => op("vslidedown", XI).unsigned_imm(),
        0x18 => op("vmseq", VXI),
        0x19 => op("vmsne", VXI),
        0x1A => op("vmsltu", VX),
        0x1B => op("vmslt", VX),
        0x1C => op("vmsleu", VXI),
        0x1D => op("vmsle", VXI),
        0x1E => op("vmsgtu", XI),
        0x1F => op("vmsgt", XI),
        0x20 => op("vsaddu", VXI),
        0x21 => op("vsadd", VXI),
        0x22 => op("vssubu", VX),
        0x23 => op("vssub", VX),
        0x24 => op("vaadd", VXI),
        0x25 => op("vsll", VXI).unsigned_imm(),
        0x26 => op("vasub", VX),
        0x27 => op("vsmul", VX),
        0x28 => op("vsrl", VXI).unsigned_imm(),
        0x29 => op("vsra", VXI).unsigned_imm(),
        0x2A => op("vssrl", VXI).unsigned_imm(),
        0x2B => op("vssra", VXI).unsigned_imm(),
        0x2C => op("vnsrl", VXI).suffix(Suffix::Wide).unsigned_imm(),
        0x2D => op("vnsra", VXI).suffix(Suffix::Wide).unsigned_imm(),
        0x2E => op("vnclipu", VXI).suffix(Suffix::Wide).unsigned_imm(),
        0x2F => op("vnclip", VXI).suffix(Suffix::Wide).unsigned_imm(),
        0x30 => op("vwredsumu", V).suffix(Suffix::Reduction),
        0x31 => op("vwredsum", V).suffix(Suffix::Reduction),
        0x38 => op("vdotu", V),
        0x39 => op("vdot", V),
        0x3C => op("vwsmaccu", VX).fused(),
        0x3D => op("vwsmacc", VX).fused(),
        0x3E => op("vwsmaccus", X).fused(),
        0x3F => op("vwsmaccsu", VX).fused(),
        _ => return None,
    };
    Some(entry)
}

fn opm(funct6: u32) -> Option<Entry> {
    let entry = match funct6 {
        0x00..=0x07 => op(INTEGER_REDUCTIONS[funct6 as usize], V).suffix(Suffix::Reduction),
        0x0E => op("vslide1up", X),
        0x0F => op("vslide1down", X),
        0x17 => op("vcompress", V).suffix(Suffix::Compress),
        0x18..=0x1F => op(MASK_LOGICAL[funct6 as usize - 0x18], V).suffix(Suffix::MaskLogical),
        0x20 => op("vdivu", VX),
        0x21 => op("vdiv", VX),
        0x22 => op("vremu", VX),
        0x23 => op("vrem", VX),
        0x24 => op("vmulhu", VX),
        0x25 => op("vmul", VX),
        0x26 => op("vmulhsu", VX),
        0x27 => op("vmulh", VX),
        0x29 => op("vmadd", VX).fused(),
        0x2B => op("vnmsub", VX).fused(),
        0x2D => op("vmacc", VX).fused(),
        0x2F => op("vnmsac", VX).fused(),
        0x30 => op("vwaddu", VX),
        0x31 => op("vwadd", VX),
        0x32 => op("vwsubu", VX),
        0x33 => op("vwsub", VX),
        0x34 => op("vwaddu", VX).suffix(Suffix::Wide),
        0x35 => op("vwadd", VX).suffix(Suffix::Wide),
        0x36 => op("vwsubu", VX).suffix(Suffix::Wide),
        0x37 => op("vwsub", VX).suffix(Suffix::Wide),
        0x38 => op("vwmulu", VX),
        0x3A => op("vwmulsu", VX),
        0x3B => op("vwmul", VX),
        0x3C => op("vwmaccu", VX).fused(),
        0x3D => op("vwmacc", VX).fused(),
        0x3E => op("vwmaccus", X).fused(),
        0x3F => op("vwmaccsu", VX).fused(),
        _ => return None,
    };
    Some(entry)
}

fn opf(funct6: u32) -> Option<Entry> {
    let entry = match funct6 {
        0x00 => op("vfadd", VF),
        0x01 => op("vfredsum", V).suffix(Suffix::Reduction),
        0x02 => op("vfsub", VF),
        0x03 => op("vfredosum", V).suffix(Suffix::Reduction),
        0x04 => op("vfmin", VF),
        0x05 => op("vfredmin", V).suffix(Suffix::Reduction),
        0x06 => op("vfmax", VF),
        0x07 => op("vfredmax", V).suffix(Suffix::Reduction),
        0x08 => op("vfsgnj", VF),
        0x09 => op("vfsgnjn", VF),
        0x0A => op("vfsgnjx", VF),
        0x18 => op("vmfeq", VF),
        0x19 => op("vmfle", VF),
        0x1B => op("vmflt", VF),
        0x1C => op("vmfne", VF),
        0x1D => op("vmfgt", F),
        0x1F => op("vmfge", F),
        0x20 => op("vfdiv", VF),
        0x21 => op("vfrdiv", F),
        0x24 => op("vfmul", VF),
        0x27 => op("vfrsub", F),
        0x28..=0x2F => op(FLOAT_FUSED[funct6 as usize - 0x28], VF).fused(),
        0x30 => op("vfwadd", VF),
        0x31 => op("vfwredsum", V).suffix(Suffix::Reduction),
        0x32 => op("vfwsub", VF),
        0x33 => op("vfwredosum", V).suffix(Suffix::Reduction),
        0x34 => op("vfwadd", VF).suffix(Suffix::Wide),
        0x36 => op("vfwsub", VF).suffix(Suffix::Wide),
        0x38 => op("vfwmul", VF),
        0x39 => op("vfdot", V),
        0x3C..=0x3F => op(FLOAT_WIDENING_FUSED[funct6 as usize - 0x3C], VF).fused(),
        _ => return None,
    };
    Some(entry)
}

impl Group {
    fn entry(self, funct6: u32) -> Option<Entry> {
        match self {
            Group::Opi => opi(funct6),
            Group::Opm => opm(funct6),
            Group::Opf => opf(funct6),
        }
    }
}

/// An OP-V word together with how its funct3 reads the operand fields
struct Fields {
    op: OpVFormat,
    operand: Operand,
    format: Format,
    raw: u32,
}

impl Fields {
    fn vs2(&self) -> Register {
        Register::v(self.op.vs2)
    }

    /// The vs1/rs1 field as a register, `None` for immediate forms
    fn operand_register(&self) -> Option<Register> {
        match self.operand {
            Operand::Vector => Some(Register::v(self.op.vs1)),
            Operand::Scalar => Some(Register::x(self.op.vs1)),
            Operand::Float => Some(Register::f(self.op.vs1)),
            Operand::Immediate => None,
        }
    }

    fn allows(&self, shapes: u8) -> bool {
        shapes & self.operand.shape() != 0
    }

    /// Instruction with the usual `vd` destination
    fn instruction(&self, name: String) -> Instruction {
        Instruction::new(name, self.format, self.raw).dest(Register::v(self.op.vd))
    }

    fn with_operands(
        &self,
        instruction: Instruction,
        fused: bool,
        unsigned_imm: bool,
    ) -> Instruction {
        match self.operand_register() {
            None if unsigned_imm => instruction.src(self.vs2()).imm(self.op.uimm5()),
            None => instruction.src(self.vs2()).imm(self.op.simm5()),
            Some(op1) if fused => instruction.src(op1).src(self.vs2()),
            Some(op1) => instruction.src(self.vs2()).src(op1),
        }
    }

    fn build(&self, entry: Entry) -> Result<Instruction, DecodeError> {
        if !self.allows(entry.shapes) {
            return Err(DecodeError::Reserved);
        }
        let letter = self.operand.letter();
        let suffix = match entry.suffix {
            Suffix::Plain => format!("v{letter}"),
            Suffix::Reduction => "vs".to_string(),
            Suffix::Wide => format!("w{letter}"),
            Suffix::MaskLogical => "mm".to_string(),
            Suffix::Compress => "vm".to_string(),
        };
        let instruction = self.instruction(format!("{}.{suffix}", entry.name));
        Ok(self
            .with_operands(instruction, entry.fused, entry.unsigned_imm)
            .with_mask(mask(self.op.vm)))
    }

    /// vadc, vmadc, vsbc, vmsbc
    fn carry(&self) -> Result<Instruction, DecodeError> {
        let (name, shapes, carry_in) = match self.op.funct6 {
            0x10 => ("vadc", VXI, true),
            0x11 => ("vmadc", VXI, false),
            0x12 => ("vsbc", VX, true),
            _ => ("vmsbc", VX, false),
        };
        if !self.allows(shapes) {
            return Err(DecodeError::Reserved);
        }
        let letter = self.operand.letter();
        let (name, carry) = match (self.op.vm, carry_in) {
            (0, _) => (format!("{name}.v{letter}m"), Some(Mask::V0)),
            (_, true) => return Err(DecodeError::Reserved),
            (_, false) => (format!("{name}.v{letter}"), None),
        };
        Ok(self.with_operands(self.instruction(name), false, false).with_mask(carry))
    }

    /// vmerge, or vmv.v.* when unmasked
    fn merge(&self) -> Instruction {
        let letter = self.operand.letter();
        if self.op.vm == 0 {
            let instruction = self.instruction(format!("vmerge.v{letter}m"));
            return self.with_operands(instruction, false, false).with_mask(Some(Mask::V0));
        }
        let instruction = self.instruction(format!("vmv.v.{letter}"));
        match self.operand_register() {
            Some(src) => instruction.src(src),
            None => instruction.imm(self.op.simm5()),
        }
    }

    /// VWXUNARY0 and VRXUNARY0: moves between element 0 and a scalar, vpopc, vfirst
    fn scalar_move(&self) -> Result<Instruction, DecodeError> {
        let op = self.op;
        match self.operand {
            Operand::Vector => {
                let (name, masked) = match op.vs1 {
                    0b00000 => ("vmv.x.s", false),
                    0b10000 => ("vpopc.m", true),
                    0b10001 => ("vfirst.m", true),
                    _ => return Err(DecodeError::Reserved),
                };
                let instruction = Instruction::new(name, self.format, self.raw)
                    .dest(Register::x(op.vd))
                    .src(self.vs2());
                Ok(instruction.with_mask(if masked { mask(op.vm) } else { None }))
            }
            Operand::Scalar if op.vs2 == 0 => {
                Ok(self.instruction("vmv.s.x".to_string()).src(Register::x(op.vs1)))
            }
            _ => Err(DecodeError::Reserved),
        }
    }

    /// VMUNARY0: set-before-first family, viota, vid
    fn mask_unary(&self) -> Result<Instruction, DecodeError> {
        if self.operand != Operand::Vector {
            return Err(DecodeError::Reserved);
        }
        let name = match self.op.vs1 {
            0b00001 => "vmsbf.m",
            0b00010 => "vmsof.m",
            0b00011 => "vmsif.m",
            0b10000 => "viota.m",
            0b10001 => {
                return Ok(self.instruction("vid.v".to_string()).with_mask(mask(self.op.vm)));
            }
            _ => return Err(DecodeError::Reserved),
        };
        Ok(self.instruction(name.to_string()).src(self.vs2()).with_mask(mask(self.op.vm)))
    }

    /// VWFUNARY0 and VRFUNARY0
    fn float_scalar_move(&self) -> Result<Instruction, DecodeError> {
        let op = self.op;
        match self.operand {
            Operand::Vector if op.vs1 == 0 => Ok(Instruction::new("vfmv.f.s", self.format, self.raw)
                .dest(Register::f(op.vd))
                .src(self.vs2())),
            Operand::Float if op.vs2 == 0 => {
                Ok(self.instruction("vfmv.s.f".to_string()).src(Register::f(op.vs1)))
            }
            _ => Err(DecodeError::Reserved),
        }
    }

    /// vfmerge, or vfmv.v.f when unmasked
    fn float_merge(&self) -> Result<Instruction, DecodeError> {
        if self.operand != Operand::Float {
            return Err(DecodeError::Reserved);
        }
        let scalar = Register::f(self.op.vs1);
        if self.op.vm == 0 {
            return Ok(self
                .instruction("vfmerge.vfm".to_string())
                .src(self.vs2())
                .src(scalar)
                .with_mask(Some(Mask::V0)));
        }
        Ok(self.instruction("vfmv.v.f".to_string()).src(scalar))
    }

    /// VFUNARY0 conversions and VFUNARY1
    fn float_unary(&self) -> Result<Instruction, DecodeError> {
        if self.operand != Operand::Vector {
            return Err(DecodeError::Reserved);
        }
        let name = match (self.op.funct6, self.op.vs1) {
            (0x22, 0b00000) => "vfcvt.xu.f.v",
            (0x22, 0b00001) => "vfcvt.x.f.v",
            (0x22, 0b00010) => "vfcvt.f.xu.v",
            (0x22, 0b00011) => "vfcvt.f.x.v",
            (0x22, 0b01000) => "vfwcvt.xu.f.v",
            (0x22, 0b01001) => "vfwcvt.x.f.v",
            (0x22, 0b01010) => "vfwcvt.f.xu.v",
            (0x22, 0b01011) => "vfwcvt.f.x.v",
            (0x22, 0b01100) => "vfwcvt.f.f.v",
            (0x22, 0b10000) => "vfncvt.xu.f.v",
            (0x22, 0b10001) => "vfncvt.x.f.v",
            (0x22, 0b10010) => "vfncvt.f.xu.v",
            (0x22, 0b10011) => "vfncvt.f.x.v",
            (0x22, 0b10100) => "vfncvt.f.f.v",
            (0x23, 0b00000) => "vfsqrt.v",
            (0x23, 0b10000) => "vfclass.v",
            _ => return Err(DecodeError::Reserved),
        };
        Ok(self.instruction(name.to_string()).src(self.vs2()).with_mask(mask(self.op.vm)))
    }
}

fn decode_op_v(word: u32) -> Result<Option<Instruction>, DecodeError> {
    let op = OpVFormat::parse(word);
    let (group, operand, format) = match op.funct3 {
        0b000 => (Group::Opi, Operand::Vector, Format::OPIVV),
        0b100 => (Group::Opi, Operand::Scalar, Format::OPIVX),
        0b011 => (Group::Opi, Operand::Immediate, Format::OPIVI),
        0b010 => (Group::Opm, Operand::Vector, Format::OPMVV),
        0b110 => (Group::Opm, Operand::Scalar, Format::OPMVX),
        0b001 => (Group::Opf, Operand::Vector, Format::OPFVV),
        0b101 => (Group::Opf, Operand::Float, Format::OPFVF),
        _ => return decode_vset(word).map(Some),
    };
    let fields = Fields { op, operand, format, raw: word };

    let instruction = match (group, op.funct6) {
        (Group::Opi, 0x10..=0x13) => fields.carry()?,
        (Group::Opi, 0x17) => fields.merge(),
        (Group::Opm, 0x10) => fields.scalar_move()?,
        (Group::Opm, 0x14) => fields.mask_unary()?,
        (Group::Opf, 0x10) => fields.float_scalar_move()?,
        (Group::Opf, 0x17) => fields.float_merge()?,
        (Group::Opf, 0x22 | 0x23) => fields.float_unary()?,
        (group, funct6) => fields.build(group.entry(funct6).ok_or(DecodeError::Reserved)?)?,
    };
    Ok(Some(instruction))
}

fn decode_vset(word: u32) -> Result<Instruction, DecodeError> {
    let v = VSetFormat::parse(word);
    if v.msb == 0 {
        return Ok(Instruction::new("vsetvli", Format::VSETVLI, word)
            .dest(Register::x(v.rd))
            .src(Register::x(v.rs1))
            .imm(v.zimm as i32));
    }
    if v.funct6 != 0 {
        return Err(DecodeError::Reserved);
    }
    Ok(Instruction::new("vsetvl", Format::VSETVL, word)
        .dest(Register::x(v.rd))
        .src(Register::x(v.rs1))
        .src(Register::x(v.rs2)))
}
