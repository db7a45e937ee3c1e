//! Per-format field slicing and immediate reconstruction
//!
//! One struct per encoding format. Each `parse` reads the named fields out of the
//! raw word and reassembles scattered immediate bits into a two's complement value,
//! bit-for-bit as the ISA manuals lay them out. Nothing here decides which
//! instruction a word is; the instruction set modules do that from these fields.
use std::fmt;

use serde::Serialize;

use crate::{
    bitfield::{
        bits, compressed_register, sign_extend, MASK1, MASK10, MASK11, MASK12, MASK2, MASK3,
        MASK4, MASK5, MASK6, MASK7, MASK8,
    },
    register::Register,
};

/// Which bit layout produced an instruction
///
/// Kept for diagnostics and grouping only, decode logic never branches on it.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Format {
    R,
    I,
    S,
    B,
    U,
    J,
    CR,
    CI,
    CSS,
    CIW,
    CL,
    CS,
    CA,
    CB,
    CJ,
    VL,
    VLS,
    VLX,
    VS,
    VSS,
    VSX,
    VAMO,
    OPIVV,
    OPIVX,
    OPIVI,
    OPMVV,
    OPMVX,
    OPFVV,
    OPFVF,
    VSETVLI,
    VSETVL,
}

impl Format {
    /// Vector memory formats render their base register as `(rs1)`
    pub const fn is_vector_memory(&self) -> bool {
        matches!(
            self,
            Format::VL
                | Format::VLS
                | Format::VLX
                | Format::VS
                | Format::VSS
                | Format::VSX
                | Format::VAMO
        )
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::VSETVLI => write!(f, "vsetvli"),
            Format::VSETVL => write!(f, "vsetvl"),
            other => write!(f, "{other:?}"),
        }
    }
}

/*
32-bit formats. The same field is always in the same position when present.

R-type | funct7 |  rs2 |  rs1 | funct3 |   rd  | opcode |
       | 31-25  |24-20 |19-15 | 14-12  | 11-7  | 6-0    |

I-type |   imm[11:0]    |  rs1 | funct3 |   rd  | opcode |
       |   31-20        |19-15 | 14-12  | 11-7  | 6-0    |

S-type | imm[11:5] |  rs2 |  rs1 | funct3 | imm[4:0] | opcode |
       | 31-25     |24-20 |19-15 | 14-12  | 11-7     | 6-0    |

B-type | imm[12] | imm[10:5] |  rs2 |  rs1 | funct3 | imm[4:1|11] | opcode |
       |   31    | 30-25     |24-20 |19-15 | 14-12  | 11-7        | 6-0    |

U-type |                imm[31:12]                 |   rd  | opcode |
       |                31-12                      | 11-7  | 6-0    |

J-type | imm[20] | imm[10:1] | imm[11] | imm[19:12] |   rd  | opcode |
       |   31    | 30-21     |   20    | 19-12      | 11-7  | 6-0    |
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RType {
    pub rd: u32,
    pub funct3: u32,
    pub rs1: u32,
    pub rs2: u32,
    pub funct7: u32,
}

impl RType {
    pub const fn parse(word: u32) -> Self {
        Self {
            rd: bits(word, 7, 5),
            funct3: bits(word, 12, 3),
            rs1: bits(word, 15, 5),
            rs2: bits(word, 20, 5),
            funct7: (word >> 25) & MASK7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IType {
    pub rd: u32,
    pub funct3: u32,
    pub rs1: u32,
    /// funct7‖rs2 as a 12-bit signed value, no shift
    pub imm: i32,
}

impl IType {
    pub const fn parse(word: u32) -> Self {
        Self {
            rd: bits(word, 7, 5),
            funct3: bits(word, 12, 3),
            rs1: bits(word, 15, 5),
            imm: sign_extend((word >> 20) & MASK12, 12),
        }
    }

    /// Shift amount of the RV32 shift-immediate forms (imm[4:0])
    pub const fn shamt(&self) -> i32 {
        self.imm & MASK5 as i32
    }

    /// imm[11:5], which holds funct7 for the shift-immediate forms
    pub const fn imm_hi(&self) -> u32 {
        ((self.imm as u32) >> 5) & MASK7
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SType {
    pub funct3: u32,
    pub rs1: u32,
    pub rs2: u32,
    /// funct7‖rd as a 12-bit signed value
    pub imm: i32,
}

impl SType {
    pub const fn parse(word: u32) -> Self {
        let imm11_5 = ((word >> 25) & MASK7) << 5;
        let imm4_0 = (word >> 7) & MASK5;
        Self {
            funct3: bits(word, 12, 3),
            rs1: bits(word, 15, 5),
            rs2: bits(word, 20, 5),
            imm: sign_extend(imm11_5 | imm4_0, 12),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BType {
    pub funct3: u32,
    pub rs1: u32,
    pub rs2: u32,
    /// {bit31, bit7, bits30:25, bits11:8, 0}, always even
    pub imm: i32,
}

impl BType {
    pub const fn parse(word: u32) -> Self {
        let imm12 = ((word >> 31) & MASK1) << 12;
        let imm11 = ((word >> 7) & MASK1) << 11;
        let imm10_5 = ((word >> 25) & MASK6) << 5;
        let imm4_1 = ((word >> 8) & MASK4) << 1;
        Self {
            funct3: bits(word, 12, 3),
            rs1: bits(word, 15, 5),
            rs2: bits(word, 20, 5),
            imm: sign_extend(imm12 | imm11 | imm10_5 | imm4_1, 13),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UType {
    pub rd: u32,
    /// bits 31:12 as a 20-bit signed value, not shifted back into place
    pub imm: i32,
}

impl UType {
    pub const fn parse(word: u32) -> Self {
        Self { rd: bits(word, 7, 5), imm: sign_extend(word >> 12, 20) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JType {
    pub rd: u32,
    /// {bit31, bits19:12, bit20, bits30:21, 0}, always even
    pub imm: i32,
}

impl JType {
    pub const fn parse(word: u32) -> Self {
        let imm20 = ((word >> 31) & MASK1) << 20;
        let imm19_12 = ((word >> 12) & MASK8) << 12;
        let imm11 = ((word >> 20) & MASK1) << 11;
        let imm10_1 = ((word >> 21) & MASK10) << 1;
        Self { rd: bits(word, 7, 5), imm: sign_extend(imm20 | imm19_12 | imm11 | imm10_1, 21) }
    }
}

/*
16-bit formats, selected by quadrant (bits [1:0]).
rd/rs1/rs2 are full 5-bit fields, rd'/rs1'/rs2' are 3-bit fields naming x8-x15.

CR-type | funct4 |   rd/rs1   |   rs2    | op |
        | 15-12  |    11-7    |   6-2    | 1-0|

CI-type | funct3 | imm |   rd/rs1   | imm | op |
        | 15-13  | 12  |    11-7    | 6-2 | 1-0|

CSS-type| funct3 |     imm     |   rs2    | op |
        | 15-13  |    12-7     |   6-2    | 1-0|

CIW-type| funct3 |     imm      | rd' | op |
        | 15-13  |     12-5     | 4-2 | 1-0|

CL-type | funct3 | imm | rs1' | imm | rd' | op |
        | 15-13  |12-10| 9-7  | 6-5 | 4-2 | 1-0|

CS-type | funct3 | imm | rs1' | imm | rs2'| op |
        | 15-13  |12-10| 9-7  | 6-5 | 4-2 | 1-0|

CA-type | funct6 | rd'/rs1' | funct2 | rs2'| op |
        | 15-10  |   9-7    |  6-5   | 4-2 | 1-0|

CB-type | funct3 | off | rs1' |    offset    | op |
        | 15-13  | 12  | 9-7  |   6-2        | 1-0|

CJ-type | funct3 |        jump target        | op |
        | 15-13  |         12-2              | 1-0|
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrFormat {
    /// bit 12, the low bit of funct4
    pub funct1: u32,
    pub rd_rs1: u32,
    pub rs2: u32,
}

impl CrFormat {
    pub const fn parse(word: u32) -> Self {
        Self {
            funct1: (word >> 12) & MASK1,
            rd_rs1: bits(word, 7, 5),
            rs2: bits(word, 2, 5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CiFormat {
    pub rd_rs1: u32,
    /// imm[5] = bit 12, imm[4:0] = bits 6:2, sign-extended
    pub imm: i32,
    raw: u32,
}

impl CiFormat {
    pub const fn parse(word: u32) -> Self {
        let imm = ((word >> 2) & MASK5) | (((word >> 12) & MASK1) << 5);
        Self { rd_rs1: bits(word, 7, 5), imm: sign_extend(imm, 6), raw: word }
    }

    /// shamt[5] = bit 12, shamt[4:0] = bits 6:2
    pub const fn shamt(&self) -> u32 {
        ((self.raw >> 2) & MASK5) | (((self.raw >> 12) & MASK1) << 5)
    }

    /// C.LUI nzimm[17:12], returned unshifted like the `lui` immediate
    pub const fn lui_imm(&self) -> i32 {
        self.imm
    }

    /// C.ADDI16SP nzimm[9:4], scaled by 16
    pub const fn addi16sp_imm(&self) -> i32 {
        let w = self.raw;
        let mut imm = 0u32;
        imm |= ((w >> 6) & MASK1) << 4; // bit[6] -> imm[4]
        imm |= ((w >> 2) & MASK1) << 5; // bit[2] -> imm[5]
        imm |= ((w >> 5) & MASK1) << 6; // bit[5] -> imm[6]
        imm |= ((w >> 3) & MASK2) << 7; // bits[4:3] -> imm[8:7]
        imm |= ((w >> 12) & MASK1) << 9; // bit[12] -> imm[9]
        sign_extend(imm, 10)
    }

    /// C.LWSP uimm[7:2]
    pub const fn lwsp_offset(&self) -> i32 {
        let w = self.raw;
        let mut offset = 0u32;
        offset |= ((w >> 4) & MASK3) << 2; // bits[6:4] -> offset[4:2]
        offset |= ((w >> 12) & MASK1) << 5; // bit[12] -> offset[5]
        offset |= ((w >> 2) & MASK2) << 6; // bits[3:2] -> offset[7:6]
        offset as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CssFormat {
    pub rs2: u32,
    /// C.SWSP uimm[7:2]
    pub offset: i32,
}

impl CssFormat {
    pub const fn parse(word: u32) -> Self {
        let mut offset = 0u32;
        offset |= ((word >> 9) & MASK4) << 2; // bits[12:9] -> offset[5:2]
        offset |= ((word >> 7) & MASK2) << 6; // bits[8:7] -> offset[7:6]
        Self { rs2: bits(word, 2, 5), offset: offset as i32 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CiwFormat {
    pub rd: Register,
    /// C.ADDI4SPN nzuimm[9:2], low two bits always zero
    pub imm: i32,
}

impl CiwFormat {
    pub const fn parse(word: u32) -> Self {
        let mut imm = 0u32;
        imm |= ((word >> 7) & MASK4) << 6; // bits[10:7] -> imm[9:6]
        imm |= ((word >> 11) & MASK2) << 4; // bits[12:11] -> imm[5:4]
        imm |= ((word >> 5) & MASK1) << 3; // bit[5] -> imm[3]
        imm |= ((word >> 6) & MASK1) << 2; // bit[6] -> imm[2]
        Self { rd: compressed_register(word >> 2), imm: imm as i32 }
    }
}

/// Word-sized offset shared by CL and CS: uimm[6:2]
const fn cl_cs_word_offset(word: u32) -> i32 {
    let mut offset = 0u32;
    offset |= ((word >> 10) & MASK3) << 3; // bits[12:10] -> offset[5:3]
    offset |= ((word >> 6) & MASK1) << 2; // bit[6] -> offset[2]
    offset |= ((word >> 5) & MASK1) << 6; // bit[5] -> offset[6]
    offset as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClFormat {
    pub rd: Register,
    pub rs1: Register,
    pub offset: i32,
}

impl ClFormat {
    pub const fn parse(word: u32) -> Self {
        Self {
            rd: compressed_register(word >> 2),
            rs1: compressed_register(word >> 7),
            offset: cl_cs_word_offset(word),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsFormat {
    pub rs1: Register,
    pub rs2: Register,
    pub offset: i32,
}

impl CsFormat {
    pub const fn parse(word: u32) -> Self {
        Self {
            rs1: compressed_register(word >> 7),
            rs2: compressed_register(word >> 2),
            offset: cl_cs_word_offset(word),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaFormat {
    /// bit 12, the only funct6 bit that varies within the group
    pub funct1: u32,
    pub rd_rs1: Register,
    pub funct2: u32,
    pub rs2: Register,
}

impl CaFormat {
    pub const fn parse(word: u32) -> Self {
        Self {
            funct1: (word >> 12) & MASK1,
            rd_rs1: compressed_register(word >> 7),
            funct2: (word >> 5) & MASK2,
            rs2: compressed_register(word >> 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CbFormat {
    pub rs1: Register,
    /// bits 11:10, selecting srli/srai/andi/CA within quadrant 1 funct3=100
    pub funct2: u32,
    /// Branch offset[8:1], always even
    pub offset: i32,
    raw: u32,
}

impl CbFormat {
    pub const fn parse(word: u32) -> Self {
        let mut offset = 0u32;
        offset |= ((word >> 3) & MASK2) << 1; // bits[4:3] -> offset[2:1]
        offset |= ((word >> 10) & MASK2) << 3; // bits[11:10] -> offset[4:3]
        offset |= ((word >> 2) & MASK1) << 5; // bit[2] -> offset[5]
        offset |= ((word >> 5) & MASK2) << 6; // bits[6:5] -> offset[7:6]
        offset |= ((word >> 12) & MASK1) << 8; // bit[12] -> offset[8]
        Self {
            rs1: compressed_register(word >> 7),
            funct2: (word >> 10) & MASK2,
            offset: sign_extend(offset, 9),
            raw: word,
        }
    }

    /// The CI-style fields reused by C.SRLI/C.SRAI/C.ANDI
    pub const fn ci(&self) -> CiFormat {
        CiFormat::parse(self.raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CjFormat {
    /// Jump offset[11:1], always even
    pub offset: i32,
}

impl CjFormat {
    pub const fn parse(word: u32) -> Self {
        let mut offset = 0u32;
        offset |= ((word >> 3) & MASK3) << 1; // bits[5:3] -> offset[3:1]
        offset |= ((word >> 11) & MASK1) << 4; // bit[11] -> offset[4]
        offset |= ((word >> 2) & MASK1) << 5; // bit[2] -> offset[5]
        offset |= ((word >> 7) & MASK1) << 6; // bit[7] -> offset[6]
        offset |= ((word >> 6) & MASK1) << 7; // bit[6] -> offset[7]
        offset |= ((word >> 9) & MASK2) << 8; // bits[10:9] -> offset[9:8]
        offset |= ((word >> 8) & MASK1) << 10; // bit[8] -> offset[10]
        offset |= ((word >> 12) & MASK1) << 11; // bit[12] -> offset[11]
        Self { offset: sign_extend(offset, 12) }
    }
}

/*
Vector formats.

VL/VS*  | nf  | mop | vm | rs2/vs2/lumop | rs1 | width | vd/vs3 | opcode |
        |31-29|28-26| 25 |    24-20      |19-15| 14-12 |  11-7  |  6-0   |

VAMO    | amoop | wd | vm | vs2 | rs1 | width | vd | opcode |
        | 31-27 | 26 | 25 |24-20|19-15| 14-12 |11-7|  6-0   |

OP-V    | funct6 | vm | vs2 | vs1/rs1/imm | funct3 | vd/rd | opcode |
        | 31-26  | 25 |24-20|    19-15    | 14-12  | 11-7  |  6-0   |

vsetvli | 0 |  zimm[10:0] | rs1 | 111 | rd | opcode |
        |31 |    30-20    |19-15|14-12|11-7|  6-0   |

vsetvl  | 1 | 000000 | rs2 | rs1 | 111 | rd | opcode |
        |31 | 30-25  |24-20|19-15|14-12|11-7|  6-0   |
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VMemFormat {
    /// Encoded segment count minus one
    pub nf: u32,
    pub mop: u32,
    /// Mask bit; zero means the operation is masked by `v0.t`
    pub vm: u32,
    /// rs2 (strided), vs2 (indexed) or lumop/sumop (unit stride)
    pub rs2: u32,
    pub rs1: u32,
    pub width: u32,
    /// vd for loads, vs3 for stores
    pub vd: u32,
}

impl VMemFormat {
    pub const fn parse(word: u32) -> Self {
        Self {
            nf: (word >> 29) & MASK3,
            mop: (word >> 26) & MASK3,
            vm: (word >> 25) & MASK1,
            rs2: bits(word, 20, 5),
            rs1: bits(word, 15, 5),
            width: bits(word, 12, 3),
            vd: bits(word, 7, 5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VAmoFormat {
    pub amoop: u32,
    /// Write the original memory value back into vd
    pub wd: u32,
    pub vm: u32,
    pub vs2: u32,
    pub rs1: u32,
    pub width: u32,
    pub vd: u32,
}

impl VAmoFormat {
    pub const fn parse(word: u32) -> Self {
        Self {
            amoop: (word >> 27) & MASK5,
            wd: (word >> 26) & MASK1,
            vm: (word >> 25) & MASK1,
            vs2: bits(word, 20, 5),
            rs1: bits(word, 15, 5),
            width: bits(word, 12, 3),
            vd: bits(word, 7, 5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpVFormat {
    pub funct6: u32,
    pub vm: u32,
    pub vs2: u32,
    /// vs1, rs1 or the 5-bit immediate, depending on funct3
    pub vs1: u32,
    pub funct3: u32,
    pub vd: u32,
}

impl OpVFormat {
    pub const fn parse(word: u32) -> Self {
        Self {
            funct6: (word >> 26) & MASK6,
            vm: (word >> 25) & MASK1,
            vs2: bits(word, 20, 5),
            vs1: bits(word, 15, 5),
            funct3: bits(word, 12, 3),
            vd: bits(word, 7, 5),
        }
    }

    /// The vs1 field as a sign-extended 5-bit immediate
    pub const fn simm5(&self) -> i32 {
        sign_extend(self.vs1, 5)
    }

    /// The vs1 field as an unsigned 5-bit immediate
    pub const fn uimm5(&self) -> i32 {
        self.vs1 as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VSetFormat {
    /// bit 31, selects vsetvl when set
    pub msb: u32,
    /// vtype immediate of vsetvli
    pub zimm: u32,
    /// bits 30:25, must be zero for vsetvl
    pub funct6: u32,
    pub rs2: u32,
    pub rs1: u32,
    pub rd: u32,
}

impl VSetFormat {
    pub const fn parse(word: u32) -> Self {
        Self {
            msb: (word >> 31) & MASK1,
            zimm: (word >> 20) & MASK11,
            funct6: (word >> 25) & MASK6,
            rs2: bits(word, 20, 5),
            rs1: bits(word, 15, 5),
            rd: bits(word, 7, 5),
        }
    }
}
