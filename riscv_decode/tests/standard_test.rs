use riscv_decode::{
    ControlFlow, DecodeError, Decoder, Error, InstructionClass, InstructionSize, Isa, Register,
};

fn rv32imc() -> Decoder {
    Decoder::new(&"32IMC".parse::<Isa>().unwrap())
}

#[test]
fn test_add_golden() {
    let decoder = rv32imc();
    let instruction = decoder.decode_hex("00e787b3").unwrap();
    assert_eq!(instruction.mnemonic(), "add");
    assert_eq!(instruction.dest_registers(), &[Register::X(15)]);
    assert_eq!(instruction.src_registers(), &[Register::X(15), Register::X(14)]);
    assert_eq!(instruction.size(), InstructionSize::Standard);
    assert_eq!(instruction.raw(), 0x00e7_87b3);
    assert_eq!(instruction.to_string(), "add a5,a5,a4");
}

#[test]
fn test_decode_hex_prefix_and_case() {
    let decoder = rv32imc();
    assert_eq!(decoder.decode_hex("0x00E787B3").unwrap().to_string(), "add a5,a5,a4");
    assert_eq!(decoder.decode_hex(" 00e787b3\n").unwrap().mnemonic(), "add");
    assert!(matches!(decoder.decode_hex("00g787b3"), Err(Error::MalformedHex(_))));
}

#[test]
fn test_addi_all_ones_immediate() {
    let decoder = rv32imc();
    // addi x1, x0, -1
    let instruction = decoder.decode_word(0xFFF0_0093).unwrap();
    assert_eq!(instruction.immediates(), &[-1]);
    assert_eq!(instruction.to_string(), "addi ra,zero,-1");
}

#[test]
fn test_mv_and_li_zero() {
    let decoder = rv32imc();
    // addi a1, a0, 0
    assert!(decoder.decode_word(0x0005_0593).unwrap().is_move());
    // addi a0, zero, 0
    let li = decoder.decode_word(0x0000_0513).unwrap();
    assert!(!li.is_move());
    assert_eq!(li.to_string(), "addi a0,zero,0");
}

#[test]
fn test_srli_srai_split_on_imm10() {
    let decoder = rv32imc();
    let shift = |imm_hi: u32| -> u32 {
        (imm_hi << 25) | // imm[11:5]
        (3 << 20) |      // shamt = 3
        (2 << 15) |      // rs1 = x2
        (0b101 << 12) |  // funct3 = SRLI/SRAI
        (1 << 7) |       // rd = x1
        0b0010011 // opcode = OP-IMM
    };

    let srli = decoder.decode_word(shift(0b000_0000)).unwrap();
    assert_eq!(srli.to_string(), "srli ra,sp,3");
    let srai = decoder.decode_word(shift(0b010_0000)).unwrap();
    assert_eq!(srai.to_string(), "srai ra,sp,3");

    let invalid = decoder.decode_word(shift(0b000_0001)).unwrap_err();
    assert_eq!(invalid.error, DecodeError::Unsupported);
}

#[test]
fn test_slli_invalid_upper_bits_rv32() {
    let decoder = rv32imc();

    // SLLI x1, x2, 1 with imm[11:5] = 0b001_0000 instead of 0
    let invalid_bits: u32 =
        (0b001_0000 << 25) | (1 << 20) | (2 << 15) | (0b001 << 12) | (1 << 7) | 0b0010011;

    let bytes = invalid_bits.to_le_bytes();
    let result = decoder.decode_bytes(&bytes);
    assert!(result.is_err());
}

#[test]
fn test_lui_auipc_immediates_unshifted() {
    let decoder = rv32imc();
    let lui = decoder.decode_word(0x1234_5537).unwrap();
    assert_eq!(lui.mnemonic(), "lui");
    assert_eq!(lui.immediates(), &[0x12345]);
    assert_eq!(decoder.decode_word(0xFFFF_F537).unwrap().immediates(), &[-1]);

    // auipc a0, 0
    let auipc = decoder.decode_word(0x0000_0517).unwrap();
    assert!(auipc.reads_pc());
    assert_eq!(auipc.dest_registers(), &[Register::X(10)]);
}

#[test]
fn test_branch_and_jump_targets() {
    let decoder = rv32imc();

    // bne a0, a1, 8
    let bne = decoder.decode_word(0x00B5_1463).unwrap();
    assert_eq!(bne.class(), InstructionClass::Control(ControlFlow::Direct));
    assert_eq!(bne.to_string(), "bne a0,a1,8");
    assert_eq!(bne.branch_target(0x100), Some(0x108));

    // jal zero, -4
    let jal = decoder.decode_word(0xFFDF_F06F).unwrap();
    assert_eq!(jal.branch_target(0x100), Some(0xFC));
    assert_eq!(jal.immediates()[0] % 2, 0);

    // ret
    let ret = decoder.decode_word(0x0000_8067).unwrap();
    assert_eq!(ret.class(), InstructionClass::Control(ControlFlow::Indirect));
    assert_eq!(ret.branch_target(0x100), None);
    assert_eq!(ret.to_string(), "jalr zero,ra,0");
}

#[test]
fn test_loads_and_stores_render_offset_base() {
    let decoder = rv32imc();
    let lw = decoder.decode_word(0x0041_2503).unwrap();
    assert!(lw.is_memory_access());
    assert_eq!(lw.to_string(), "lw a0,4(sp)");

    let sw = decoder.decode_word(0xFEB1_2E23).unwrap();
    assert!(sw.dest_registers().is_empty());
    assert_eq!(sw.src_registers(), &[Register::SP, Register::X(11)]);
    assert_eq!(sw.to_string(), "sw a1,-4(sp)");
}

#[test]
fn test_system_and_fence() {
    let decoder = rv32imc();
    let ecall = decoder.decode_word(0x0000_0073).unwrap();
    assert_eq!(ecall.to_string(), "ecall");
    assert!(ecall.is_control_transfer());
    assert_eq!(decoder.decode_word(0x0010_0073).unwrap().mnemonic(), "ebreak");

    // csrrw x0, mscratch, x2 is not handled
    assert_eq!(decoder.decode_word(0x3401_1073).unwrap_err().error, DecodeError::Unsupported);

    let fence = decoder.decode_word(0x0FF0_000F).unwrap();
    assert_eq!(fence.to_string(), "fence");
    assert!(fence.is_memory_access());
}

#[test]
fn test_multiply_needs_m_extension() {
    // mul a0, a1, a2
    let mul = 0x02C5_8533;
    let base = Decoder::new(&"32I".parse::<Isa>().unwrap());
    assert_eq!(base.decode_word(mul).unwrap_err().error, DecodeError::Unsupported);

    let decoder = rv32imc();
    let instruction = decoder.decode_word(mul).unwrap();
    assert_eq!(instruction.to_string(), "mul a0,a1,a2");
    assert!(instruction.is_multiply());

    // divu a0, a1, a2
    assert_eq!(decoder.decode_word(0x02C5_D533).unwrap().mnemonic(), "divu");
}

#[test]
fn test_unknown_opcode() {
    let failure = rv32imc().decode_word(0x0000_007B).unwrap_err();
    assert_eq!(failure.error, DecodeError::UnknownOpcode(0x7B));
    assert_eq!(failure.size, InstructionSize::Standard);
}

#[test]
fn test_size_follows_low_bits() {
    let decoder = rv32imc();
    for word in [0x00e7_87b3, 0x0000_0001, 0x0000_4501, 0x0000_0000, 0xFFFF_FFFF, 0x1234_5672] {
        let size = match decoder.decode_word(word) {
            Ok(instruction) => instruction.size(),
            Err(failure) => failure.size,
        };
        let expected = if word & 0b11 == 0b11 { 32 } else { 16 };
        assert_eq!(size.bits(), expected, "word {word:#x}");
    }
}

#[test]
fn test_decode_is_idempotent() {
    let decoder = rv32imc();
    assert_eq!(decoder.decode_word(0xFEB1_2E23), decoder.decode_word(0xFEB1_2E23));
}

#[test]
fn test_decode_words_keeps_order() {
    let decoder = rv32imc();
    let words = [0x00e7_87b3, 0x0000_007B, 0x0041_2503];
    let results = decoder.decode_words(&words);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().mnemonic(), "add");
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().mnemonic(), "lw");
}

#[test]
fn test_decode_mixed_byte_stream() {
    let decoder = rv32imc();
    // c.nop, then add a5,a5,a4
    let bytes = [0x01, 0x00, 0xb3, 0x87, 0xe7, 0x00];
    let instructions = decoder.decode_bytes(&bytes).unwrap();
    assert_eq!(instructions.len(), 2);
    assert_eq!(instructions[0].mnemonic(), "c.nop");
    assert_eq!(instructions[1].mnemonic(), "add");
}
