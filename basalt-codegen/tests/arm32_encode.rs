//! Encoder, constant pool and linker behaviour over whole programs.

use basalt_asm::{Cond, DataInstr, DataOp, FReg, FpaSize, Instr, Op2, Reg};
use basalt_codegen::arm32::{
    encode_to_vec, ArmOp, ArmProg, ArmSection, ConstantData, EncodeOptions, FloatArch,
};

fn word_at(code: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(code[offset..offset + 4].try_into().unwrap())
}

fn mov_r1_r2() -> Instr {
    Instr::Data(DataInstr {
        op: DataOp::Mov,
        cond: Cond::Al,
        status: false,
        dest: Reg(1),
        op1: Reg(0),
        op2: Op2::Reg(Reg(2)),
    })
}

fn encode_single(section: ArmSection) -> Vec<u8> {
    let mut prog = ArmProg::new(FloatArch::Fpa {
        reverse_consts: true,
    });
    prog.add_section(section);
    encode_to_vec(&prog, &EncodeOptions::default()).expect("encode")
}

#[test]
fn simple_section_round_trips_to_bytes() {
    let mut s = ArmSection::new();
    s.add_add_imm(Cond::Al, false, Reg(0), Reg(1), 1).unwrap();
    let code = encode_single(s);
    assert_eq!(code.len(), 4);
    assert_eq!(word_at(&code, 0), 0xE281_0001);
}

#[test]
fn pool_load_is_patched_at_section_end() {
    let mut s = ArmSection::new();
    s.add_ldrc(Cond::Al, Reg(0), 0xDEAD_BEEF);
    s.add_mov_reg(Cond::Al, false, Reg::PC, Reg::LR);
    let code = encode_single(s);

    // LDR, return, then the literal; the load reaches forward over
    // the return: offset = 8 - 0 - 8.
    assert_eq!(code.len(), 12);
    assert_eq!(word_at(&code, 0), 0xE59F_0000);
    assert_eq!(word_at(&code, 8), 0xDEAD_BEEF);
}

#[test]
fn identical_literals_share_a_pool_label() {
    let mut s = ArmSection::new();
    s.add_ldrc(Cond::Al, Reg(0), 0x1234_5678);
    s.add_ldrc(Cond::Al, Reg(1), 0x1234_5678);
    assert_eq!(s.int_constants().len(), 1);
}

#[test]
fn window_overflow_flushes_pool_behind_a_branch() {
    let mut s = ArmSection::new();
    s.add_ldrc(Cond::Al, Reg(0), 0xDEAD_BEEF);
    for _ in 0..1100 {
        s.add_instr(mov_r1_r2());
    }
    let code = encode_single(s);

    // The check runs before the instruction that would land at 4088:
    // pool end would reach 4092 bytes past the pending load. An
    // unconditional branch guards the pool word.
    assert_eq!(word_at(&code, 4088), 0xEA00_0000);
    assert_eq!(word_at(&code, 4092), 0xDEAD_BEEF);
    // The pending LDR gets the literal's PC-relative offset.
    assert_eq!(word_at(&code, 0), 0xE59F_0000 | (4092 - 8));
    // The stream resumes after the pool.
    assert_eq!(word_at(&code, 4096), 0xE1A0_1002);
    // One literal only; the rest of the image has no second copy.
    let copies = code
        .chunks_exact(4)
        .filter(|w| u32::from_le_bytes((*w).try_into().unwrap()) == 0xDEAD_BEEF)
        .count();
    assert_eq!(copies, 1);
}

#[test]
fn cross_section_call_resolves_to_section_start() {
    let mut prog = ArmProg::new(FloatArch::Vfp);

    let mut caller = ArmSection::new();
    for _ in 0..4 {
        caller.add_instr(mov_r1_r2());
    }
    caller.add_call(Cond::Al, 1);
    for _ in 0..1019 {
        caller.add_instr(mov_r1_r2());
    }
    prog.add_section(caller);

    let mut callee = ArmSection::new();
    callee.add_instr(mov_r1_r2());
    prog.add_section(callee);

    let code = encode_to_vec(&prog, &EncodeOptions::default()).expect("encode");

    // Section 1 starts at 0x1000 and the call sits at 0x10:
    // (0x1000/4 - (0x10/4 + 2)) & 0xffffff = 0x3fa.
    assert_eq!(word_at(&code, 0x10), 0xEB00_03FA);
}

#[test]
fn adr_reaches_forwards_and_backwards() {
    let mut s = ArmSection::new();
    let back = s.fresh_label();
    let fwd = s.fresh_label();
    s.add_label(back);
    s.add_instr(mov_r1_r2());
    s.add_instr(mov_r1_r2());
    s.add_adr(Cond::Al, Reg(0), back); // offset 8, target 0
    s.add_adr(Cond::Al, Reg(1), fwd); // offset 12, target 20
    s.add_instr(mov_r1_r2());
    s.add_label(fwd);
    let code = encode_single(s);

    // dist 0 - 8 - 8 = -16: rewritten to SUB r0, pc, #16.
    assert_eq!(word_at(&code, 8), 0xE24F_0010);
    // dist 20 - 12 - 8 = 0: ADD r1, pc, #0.
    assert_eq!(word_at(&code, 12), 0xE28F_1000);
}

#[test]
fn unencodable_adr_distance_is_reported() {
    let mut s = ArmSection::new();
    let label = s.fresh_label();
    s.add_adr(Cond::Al, Reg(0), label);
    for _ in 0..258 {
        s.add_instr(mov_r1_r2());
    }
    s.add_label(label); // 0x40c bytes in; dist 0x404 has no rotation
    s.add_instr(mov_r1_r2());

    let mut prog = ArmProg::new(FloatArch::Vfp);
    prog.add_section(s);
    let err = encode_to_vec(&prog, &EncodeOptions::default()).unwrap_err();
    assert!(matches!(err, basalt_codegen::Error::BadAdr { dist: 0x404 }));
}

#[test]
fn conditional_move_lowers_to_cmp_and_two_movs() {
    use basalt_asm::CmovInstr;
    let mut s = ArmSection::new();
    s.add_instr(Instr::Cmov(CmovInstr {
        dest: Reg(0),
        op1: Reg(1),
        op2: Reg(2),
        op3: Reg(3),
        fused: false,
        true_cond: Cond::Al,
        false_cond: Cond::Al,
    }));
    let code = encode_single(s);

    assert_eq!(code.len(), 12);
    assert_eq!(word_at(&code, 0), 0xE351_0000); // CMP r1, #0
    assert_eq!(word_at(&code, 4), 0x01A0_0003); // MOVEQ r0, r3
    assert_eq!(word_at(&code, 8), 0x11A0_0002); // MOVNE r0, r2
}

#[test]
fn program_constant_address_load_links() {
    let mut prog = ArmProg::new(FloatArch::Vfp);
    let blob = prog.add_constant(ConstantData {
        bytes: b"hello".to_vec(),
        is_double: false,
    });

    let mut s = ArmSection::new();
    s.add_const_addr(Cond::Al, Reg(0), blob);
    s.add_mov_reg(Cond::Al, false, Reg::PC, Reg::LR);
    prog.add_section(s);

    let code = encode_to_vec(&prog, &EncodeOptions::default()).expect("encode");

    // LDR at 0, ADD at 4, return at 8, pool word at 12, blob at 16
    // padded to a word boundary.
    assert_eq!(code.len(), 16 + 8);
    assert_eq!(word_at(&code, 0), 0xE59F_0004);
    assert_eq!(word_at(&code, 4), 0xE08F_0000); // ADD r0, pc, r0
    // The pool word receives blob - ldr - 12: the ADD's PC plus the
    // loaded value lands on the blob.
    assert_eq!(word_at(&code, 12), 4);
    assert_eq!(&code[16..21], b"hello");
    assert_eq!(code[21], 0);
}

#[test]
fn fpa_double_pool_is_word_reversed() {
    let mut s = ArmSection::new();
    s.add_fpa_ldrc(Cond::Al, FpaSize::Double, FReg(0), 1.5);
    s.add_mov_reg(Cond::Al, false, Reg::PC, Reg::LR);
    let code = encode_single(s); // FPA with reversed consts

    let bits = 1.5f64.to_bits();
    assert_eq!(word_at(&code, 8), (bits >> 32) as u32);
    assert_eq!(word_at(&code, 12), bits as u32);
    // LDF r0, [pc, #0]: the double starts right after the return,
    // and the offset field counts words.
    assert_eq!(word_at(&code, 0), 0xED9F_8100);
}

#[test]
fn vfp_double_pool_is_natural_order() {
    let mut prog = ArmProg::new(FloatArch::Vfp);
    let mut s = ArmSection::new();
    s.add_vfp_ldrc(Cond::Al, basalt_asm::VReg(0), 1.5);
    s.add_mov_reg(Cond::Al, false, Reg::PC, Reg::LR);
    prog.add_section(s);
    let code = encode_to_vec(&prog, &EncodeOptions::default()).expect("encode");

    let bits = 1.5f64.to_bits();
    assert_eq!(word_at(&code, 8), bits as u32);
    assert_eq!(word_at(&code, 12), (bits >> 32) as u32);
}

#[test]
fn directives_land_verbatim_and_sections_align() {
    let mut s = ArmSection::new();
    s.add_op(ArmOp::String("abcd".into()));
    s.add_op(ArmOp::Align(4));
    s.add_op(ArmOp::FourByte(0x11223344));
    s.add_op(ArmOp::Byte(0x7f));
    let code = encode_single(s);

    assert_eq!(&code[0..5], b"abcd\0");
    assert_eq!(&code[5..8], &[0, 0, 0]); // alignment padding
    assert_eq!(word_at(&code, 8), 0x11223344);
    assert_eq!(code[12], 0x7f);
    // The section end forces word alignment.
    assert_eq!(code.len() % 4, 0);
    assert_eq!(code.len(), 16);
}

#[test]
fn double_directives_respect_word_order() {
    let bits = 2.5f64.to_bits();

    let mut s = ArmSection::new();
    s.add_op(ArmOp::Double(2.5));
    s.add_op(ArmOp::DoubleR(2.5));
    let code = encode_single(s);

    assert_eq!(word_at(&code, 0), bits as u32);
    assert_eq!(word_at(&code, 4), (bits >> 32) as u32);
    assert_eq!(word_at(&code, 8), (bits >> 32) as u32);
    assert_eq!(word_at(&code, 12), bits as u32);
}

#[test]
fn branches_within_a_section_are_back_patched() {
    let mut s = ArmSection::new();
    let target = s.fresh_label();
    s.add_br(Cond::Al, target); // 0: forward over one mov
    s.add_instr(mov_r1_r2()); // 4
    s.add_label(target);
    s.add_instr(mov_r1_r2()); // 8
    s.add_br(Cond::Ne, target); // 12: backwards
    let code = encode_single(s);

    // 0 -> 8: (8 - 0)/4 - 2 = 0.
    assert_eq!(word_at(&code, 0), 0xEA00_0000);
    // 12 -> 8: (8 - 12)/4 - 2 = -3.
    assert_eq!(word_at(&code, 12), 0x1AFF_FFFD);
}

#[test]
fn double_blob_is_swapped_per_eight_bytes_when_reversed() {
    let mut prog = ArmProg::new(FloatArch::Fpa {
        reverse_consts: true,
    });
    let one = 1.0f64.to_bits().to_le_bytes();
    let two = 2.0f64.to_bits().to_le_bytes();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&one);
    bytes.extend_from_slice(&two);
    prog.add_constant(ConstantData {
        bytes,
        is_double: true,
    });

    let mut s = ArmSection::new();
    s.add_instr(mov_r1_r2());
    prog.add_section(s);

    let code = encode_to_vec(&prog, &EncodeOptions::default()).expect("encode");
    assert_eq!(word_at(&code, 4), (1.0f64.to_bits() >> 32) as u32);
    assert_eq!(word_at(&code, 8), 1.0f64.to_bits() as u32);
    assert_eq!(word_at(&code, 12), (2.0f64.to_bits() >> 32) as u32);
    assert_eq!(word_at(&code, 16), 2.0f64.to_bits() as u32);
}
