/// Major opcodes (bits [6:0]) of the 32-bit encodings handled here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Load = 0b000_0011,
    LoadFp = 0b000_0111,
    MiscMem = 0b000_1111,
    OpImm = 0b001_0011,
    Auipc = 0b001_0111,
    Store = 0b010_0011,
    StoreFp = 0b010_0111,
    Amo = 0b010_1111,
    Op = 0b011_0011,
    Lui = 0b011_0111,
    OpV = 0b101_0111,
    Branch = 0b110_0011,
    Jalr = 0b110_0111,
    Jal = 0b110_1111,
    System = 0b111_0011,
}

impl Opcode {
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b000_0011 => Some(Opcode::Load),
            0b000_0111 => Some(Opcode::LoadFp),
            0b000_1111 => Some(Opcode::MiscMem),
            0b001_0011 => Some(Opcode::OpImm),
            0b001_0111 => Some(Opcode::Auipc),
            0b010_0011 => Some(Opcode::Store),
            0b010_0111 => Some(Opcode::StoreFp),
            0b010_1111 => Some(Opcode::Amo),
            0b011_0011 => Some(Opcode::Op),
            0b011_0111 => Some(Opcode::Lui),
            0b101_0111 => Some(Opcode::OpV),
            0b110_0011 => Some(Opcode::Branch),
            0b110_0111 => Some(Opcode::Jalr),
            0b110_1111 => Some(Opcode::Jal),
            0b111_0011 => Some(Opcode::System),
            _ => None,
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }
}
