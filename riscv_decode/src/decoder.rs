//! Dispatch over the composed opcode tables
use rayon::prelude::*;

use crate::{
    bitfield::FieldExtractor,
    error::{DecodeError, DecodeFailure, Error},
    instruction::{Instruction, InstructionSize},
    isa::{DecodeFn, InstructionSet, Isa, OpcodeKey},
};

/// Number of distinct 7-bit major opcodes
const STANDARD_KEYS: usize = 128;

/// Compressed quadrants; quadrant 3 is the 32-bit space and stays empty
const COMPRESSED_KEYS: usize = 4;

/// Instruction decoder for one ISA configuration
///
/// Handlers that share a key are tried in registration order, which is the
/// extension order I, M, C, V. The tables are built once and never change, so a
/// decoder can be shared freely across threads.
pub struct Decoder {
    standard: [Vec<DecodeFn>; STANDARD_KEYS],
    compressed: [Vec<DecodeFn>; COMPRESSED_KEYS],
}

impl Decoder {
    pub fn new(isa: &Isa) -> Self {
        Self::with_instruction_sets(&isa.instruction_sets())
    }

    /// Compose the given instruction sets, in order
    pub fn with_instruction_sets(sets: &[&dyn InstructionSet]) -> Self {
        let mut decoder = Self {
            standard: std::array::from_fn(|_| Vec::new()),
            compressed: std::array::from_fn(|_| Vec::new()),
        };
        for set in sets {
            for &(key, handler) in set.opcode_table() {
                match key {
                    OpcodeKey::Standard(opcode) => {
                        decoder.standard[opcode.bits() as usize].push(handler)
                    }
                    OpcodeKey::Compressed(quadrant) => {
                        decoder.compressed[quadrant as usize % COMPRESSED_KEYS].push(handler)
                    }
                }
            }
        }
        decoder
    }

    /// Decode one instruction word
    ///
    /// The width is taken from the low two bits before anything else. Compressed
    /// words only use the low 16 bits.
    pub fn decode_word(&self, word: u32) -> Result<Instruction, DecodeFailure> {
        let size = InstructionSize::of(word);
        let (word, handlers, key) = match size {
            InstructionSize::Standard => {
                let opcode = word.opcode();
                (word, &self.standard[opcode as usize], opcode)
            }
            InstructionSize::Compressed => {
                let word = word & 0xFFFF;
                let quadrant = word.quadrant();
                (word, &self.compressed[quadrant as usize], quadrant)
            }
        };
        let fail = |error| DecodeFailure { raw: word, size, error };

        if handlers.is_empty() {
            return Err(fail(DecodeError::UnknownOpcode(key)));
        }
        for handler in handlers {
            if let Some(instruction) = handler(word).map_err(fail)? {
                return Ok(instruction);
            }
        }
        Err(fail(DecodeError::Unsupported))
    }

    /// Decode a hex encoded word such as `00e787b3` or `0x4501`
    pub fn decode_hex(&self, hex: &str) -> Result<Instruction, Error> {
        let digits = hex.trim();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);
        if digits.is_empty() || digits.len() > 8 {
            return Err(Error::MalformedHex(hex.to_string()));
        }
        let word =
            u32::from_str_radix(digits, 16).map_err(|_| Error::MalformedHex(hex.to_string()))?;
        Ok(self.decode_word(word)?)
    }

    /// Decode independent words in parallel, keeping their order
    pub fn decode_words(&self, words: &[u32]) -> Vec<Result<Instruction, DecodeFailure>> {
        words.par_iter().map(|&word| self.decode_word(word)).collect()
    }

    /// Decode a little-endian instruction stream of mixed 16/32-bit instructions
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<Vec<Instruction>, Error> {
        let mut instructions = Vec::with_capacity(bytes.len() / 2);
        let mut i = 0;

        while i + 2 <= bytes.len() {
            // Read first 16-bit half
            let first_half = u16::from_le_bytes([bytes[i], bytes[i + 1]]) as u32;

            match InstructionSize::of(first_half) {
                InstructionSize::Compressed => {
                    instructions.push(self.decode_word(first_half)?);
                    i += 2;
                }
                InstructionSize::Standard => {
                    // 32-bit instruction - need second half
                    if i + 4 > bytes.len() {
                        return Err(Error::ReadingPastEof);
                    }
                    let second_half = u16::from_le_bytes([bytes[i + 2], bytes[i + 3]]) as u32;
                    instructions.push(self.decode_word(first_half | (second_half << 16))?);
                    i += 4;
                }
            }
        }

        if i != bytes.len() {
            return Err(Error::ReadingPastEof);
        }
        Ok(instructions)
    }
}

impl Default for Decoder {
    /// RV32IMC
    fn default() -> Self {
        Self::new(&Isa::rv32imc())
    }
}
