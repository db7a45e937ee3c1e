use riscv_decode::{
    ControlFlow, DecodeError, Decoder, InstructionClass, InstructionSize, Isa, Register,
};

fn decoder() -> Decoder {
    Decoder::new(&Isa::rv32imc())
}

#[test]
fn test_c_nop() {
    let decoder = decoder();
    let bytes = vec![0x01, 0x00]; // 0x0001 in little endian
    let result = decoder.decode_bytes(&bytes).unwrap();
    assert_eq!(result.len(), 1);

    let instruction = &result[0];
    assert_eq!(instruction.mnemonic(), "c.nop");
    assert_eq!(instruction.size(), InstructionSize::Compressed);
    assert!(instruction.src_registers().is_empty());
    assert!(instruction.dest_registers().is_empty());
    assert!(instruction.immediates().is_empty());
    assert_eq!(instruction.to_string(), "c.nop");
}

#[test]
fn test_all_zero_word_is_illegal() {
    let failure = decoder().decode_hex("0000").unwrap_err();
    assert!(failure.to_string().contains("Illegal"));
    let failure = decoder().decode_word(0).unwrap_err();
    assert_eq!(failure.error, DecodeError::Illegal);
    assert_eq!(failure.size, InstructionSize::Compressed);
}

#[test]
fn test_c_addi4spn() {
    // C.ADDI4SPN x8, x2, 8
    let instruction = decoder().decode_word(0x0020).unwrap();
    assert_eq!(instruction.to_string(), "c.addi4spn s0,sp,8");
}

#[test]
fn test_c_lw_and_sw() {
    let decoder = decoder();
    let lw = decoder.decode_word(0x41C8).unwrap();
    assert!(lw.is_memory_access());
    assert_eq!(lw.to_string(), "c.lw a0,4(a1)");

    let lwsp = decoder.decode_word(0x40B2).unwrap();
    assert_eq!(lwsp.to_string(), "c.lwsp ra,12(sp)");

    let swsp = decoder.decode_word(0xC606).unwrap();
    assert_eq!(swsp.to_string(), "c.swsp ra,12(sp)");
}

#[test]
fn test_c_lui_forms() {
    let decoder = decoder();
    // c.lui x0, 1
    assert_eq!(decoder.decode_word(0x6005).unwrap_err().error, DecodeError::LuiZeroDestination);
    // c.lui a0, 0
    assert_eq!(decoder.decode_word(0x6501).unwrap_err().error, DecodeError::Reserved);
    // c.lui a0, 1
    assert_eq!(decoder.decode_word(0x6505).unwrap().to_string(), "c.lui a0,1");
    // c.lui a0, 0x3f: nzimm[17] set, sign-extended
    assert_eq!(decoder.decode_word(0x757D).unwrap().immediates(), &[-1]);
}

#[test]
fn test_c_li_and_addi16sp() {
    let decoder = decoder();
    assert_eq!(decoder.decode_word(0x4515).unwrap().to_string(), "c.li a0,5");
    assert_eq!(decoder.decode_word(0x7179).unwrap().to_string(), "c.addi16sp sp,sp,-48");
}

#[test]
fn test_c_jumps_and_branches() {
    let decoder = decoder();
    let j = decoder.decode_word(0xBFFD).unwrap();
    assert_eq!(j.mnemonic(), "c.j");
    assert!(j.dest_registers().is_empty());
    assert_eq!(j.branch_target(0x102), Some(0x100));

    let beqz = decoder.decode_word(0xDD7D).unwrap();
    assert_eq!(beqz.to_string(), "c.beqz a0,-2");
    assert_eq!(beqz.class(), InstructionClass::Control(ControlFlow::Direct));

    let jal = decoder.decode_word(0x2001).unwrap();
    assert_eq!(jal.dest_registers(), &[Register::RA]);
    assert_eq!(jal.branch_target(0x40), Some(0x40));
}

#[test]
fn test_quadrant1_arithmetic_group() {
    let decoder = decoder();
    assert_eq!(decoder.decode_word(0x810D).unwrap().to_string(), "c.srli a0,a0,3");
    // c.srai with shamt[5] set is reserved on RV32
    assert_eq!(decoder.decode_word(0x950D).unwrap_err().error, DecodeError::Reserved);
    assert_eq!(decoder.decode_word(0x8C05).unwrap().to_string(), "c.sub s0,s0,s1");
    assert_eq!(decoder.decode_word(0x8C65).unwrap().to_string(), "c.and s0,s0,s1");
}

#[test]
fn test_quadrant2_jr_mv_ebreak_jalr_add() {
    let decoder = decoder();

    let jr = decoder.decode_word(0x8082).unwrap();
    assert_eq!(jr.to_string(), "c.jr ra");
    assert_eq!(jr.class(), InstructionClass::Control(ControlFlow::Indirect));

    let mv = decoder.decode_word(0x852E).unwrap();
    assert_eq!(mv.to_string(), "c.mv a0,a1");
    assert!(mv.is_move());

    assert_eq!(decoder.decode_word(0x9002).unwrap().mnemonic(), "c.ebreak");

    let jalr = decoder.decode_word(0x9502).unwrap();
    assert_eq!(jalr.dest_registers(), &[Register::RA]);
    assert_eq!(jalr.src_registers(), &[Register::X(10)]);

    assert_eq!(decoder.decode_word(0x952E).unwrap().to_string(), "c.add a0,a0,a1");

    // c.jr x0
    assert_eq!(decoder.decode_word(0x8002).unwrap_err().error, DecodeError::Reserved);
}

#[test]
fn test_float_forms_unsupported() {
    // c.fld fs0, 0(a0)
    assert_eq!(decoder().decode_word(0x2100).unwrap_err().error, DecodeError::Unsupported);
}

#[test]
fn test_compressed_needs_c_extension() {
    let decoder = Decoder::new(&Isa::new().with_m());
    assert_eq!(decoder.decode_word(0x4515).unwrap_err().error, DecodeError::UnknownOpcode(0b01));
}

#[test]
fn test_upper_half_ignored_for_compressed() {
    let decoder = decoder();
    let instruction = decoder.decode_word(0xFFFF_4515).unwrap();
    assert_eq!(instruction.raw(), 0x4515);
    assert_eq!(instruction.to_string(), "c.li a0,5");
}
