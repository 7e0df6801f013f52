use crate::*;
use proptest::prelude::*;
use rstest::rstest;
use strum::IntoEnumIterator;

fn add_r0_r1_imm1() -> Instr {
    Instr::Data(DataInstr {
        op: DataOp::Add,
        cond: Cond::Al,
        status: false,
        dest: Reg(0),
        op1: Reg(1),
        op2: Op2::Imm(1),
    })
}

#[rstest]
#[case::add_imm(add_r0_r1_imm1(), 0xE281_0001)]
#[case::mov_reg(
    Instr::Data(DataInstr {
        op: DataOp::Mov,
        cond: Cond::Al,
        status: false,
        dest: Reg(0),
        op1: Reg(0),
        op2: Op2::Reg(Reg(1)),
    }),
    0xE1A0_0001
)]
#[case::swi(Instr::Swi(SwiInstr { cond: Cond::Al, code: 0x11 }), 0xEF00_0011)]
#[case::ldr_pc(
    Instr::Stran(StranInstr {
        op: StranOp::Ldr,
        cond: Cond::Al,
        byte: false,
        pre_indexed: true,
        write_back: false,
        subtract: false,
        dest: Reg(0),
        base: Reg::PC,
        offset: Op2::Imm(0),
    }),
    0xE59F_0000
)]
#[case::stmfd(
    Instr::Mtran(MtranInstr {
        op: MtranOp::Stm,
        cond: Cond::Al,
        op0: Reg::SP,
        regs: RegList::R0 | RegList::LR,
        mode: MtranMode::Fd,
        write_back: true,
        status: false,
    }),
    0xE92D_4001
)]
#[case::ldmfd(
    Instr::Mtran(MtranInstr {
        op: MtranOp::Ldm,
        cond: Cond::Al,
        op0: Reg::SP,
        regs: RegList::R0 | RegList::PC,
        mode: MtranMode::Fd,
        write_back: true,
        status: false,
    }),
    0xE8BD_8001
)]
#[case::branch_self(
    Instr::Br(BrInstr {
        cond: Cond::Al,
        link: false,
        target: BranchTarget::Offset(-2),
    }),
    0xEAFF_FFFE
)]
#[case::mul(
    Instr::Mul(MulInstr {
        cond: Cond::Al,
        status: false,
        dest: Reg(0),
        rm: Reg(1),
        rs: Reg(2),
        acc: None,
    }),
    0xE000_0291
)]
#[case::ldrh(
    Instr::StranMisc(StranMiscInstr {
        op: StranOp::Ldr,
        cond: Cond::Al,
        width: MiscWidth::H,
        pre_indexed: true,
        write_back: false,
        subtract: false,
        dest: Reg(0),
        base: Reg(1),
        offset: MiscOffset::Imm(2),
    }),
    0xE1D1_00B2
)]
fn known_words(#[case] instr: Instr, #[case] expected: u32) {
    assert_eq!(encode(&instr).unwrap(), expected);
}

#[test]
fn known_words_decode_back() {
    assert_eq!(disass(0xE281_0001, FloatModel::Fpa).unwrap(), add_r0_r1_imm1());
    let swi = disass(0xEF00_0011, FloatModel::Fpa).unwrap();
    assert_eq!(
        swi,
        Instr::Swi(SwiInstr {
            cond: Cond::Al,
            code: 0x11
        })
    );
}

#[test]
fn pseudo_instructions_need_a_section() {
    let ldrc = Instr::Ldrc(LdrcInstr {
        cond: Cond::Al,
        dest: Reg(0),
        label: 0,
        link_time: false,
    });
    assert!(matches!(encode(&ldrc), Err(Error::NeedsSection(_))));

    let adr = Instr::Adr(AdrInstr {
        cond: Cond::Al,
        dest: Reg(0),
        label: 0,
    });
    assert!(matches!(encode(&adr), Err(Error::NeedsSection(_))));
}

#[test]
fn out_of_range_registers_are_rejected() {
    let instr = Instr::Data(DataInstr {
        op: DataOp::Add,
        cond: Cond::Al,
        status: false,
        dest: Reg(16),
        op1: Reg(1),
        op2: Op2::Imm(1),
    });
    assert!(matches!(encode(&instr), Err(Error::OutOfRange(_))));
}

#[test]
fn rrx_is_an_internal_error() {
    let instr = Instr::Data(DataInstr {
        op: DataOp::Mov,
        cond: Cond::Al,
        status: false,
        dest: Reg(0),
        op1: Reg(0),
        op2: Op2::Shifted(Shift {
            reg: Reg(1),
            kind: ShiftKind::Rrx,
            count: ShiftCount::Imm(1),
        }),
    });
    assert!(matches!(encode(&instr), Err(Error::Assertion(_))));
}

/// One representative record per encodable class, both float models.
fn sample_instructions() -> Vec<(Instr, FloatModel)> {
    use FloatModel::{Fpa, Vfp};
    let mut v = Vec::new();

    for op in DataOp::iter() {
        v.push((
            Instr::Data(DataInstr {
                op,
                cond: Cond::Ne,
                status: op == DataOp::Cmp,
                dest: Reg(3),
                op1: Reg(4),
                op2: Op2::Shifted(Shift {
                    reg: Reg(5),
                    kind: ShiftKind::Asr,
                    count: ShiftCount::Imm(7),
                }),
            }),
            Fpa,
        ));
    }
    v.push((
        Instr::Mul(MulInstr {
            cond: Cond::Al,
            status: true,
            dest: Reg(1),
            rm: Reg(2),
            rs: Reg(3),
            acc: Some(Reg(4)),
        }),
        Fpa,
    ));
    v.push((
        Instr::Stran(StranInstr {
            op: StranOp::Str,
            cond: Cond::Gt,
            byte: true,
            pre_indexed: false,
            write_back: true,
            subtract: true,
            dest: Reg(2),
            base: Reg(9),
            offset: Op2::Shifted(Shift {
                reg: Reg(1),
                kind: ShiftKind::Lsl,
                count: ShiftCount::Imm(2),
            }),
        }),
        Fpa,
    ));
    for width in MiscWidth::iter() {
        v.push((
            Instr::StranMisc(StranMiscInstr {
                // Signed loads have no store form.
                op: if matches!(width, MiscWidth::Sb | MiscWidth::Sh) {
                    StranOp::Ldr
                } else {
                    StranOp::Str
                },
                cond: Cond::Al,
                width,
                pre_indexed: true,
                write_back: false,
                subtract: true,
                dest: Reg(2),
                base: Reg(3),
                offset: MiscOffset::Imm(0xab),
            }),
            Fpa,
        ));
    }
    v.push((
        Instr::Br(BrInstr {
            cond: Cond::Lt,
            link: true,
            target: BranchTarget::Offset(-100),
        }),
        Fpa,
    ));
    v.push((
        Instr::Flags(FlagsInstr {
            op: FlagsOp::Mrs,
            cond: Cond::Al,
            flag_reg: StatusReg::Cpsr,
            fields: 0,
            operand: FlagsOperand::Reg(Reg(4)),
        }),
        Fpa,
    ));
    v.push((
        Instr::Flags(FlagsInstr {
            op: FlagsOp::Msr,
            cond: Cond::Al,
            flag_reg: StatusReg::Spsr,
            fields: 0x9,
            operand: FlagsOperand::Reg(Reg(4)),
        }),
        Fpa,
    ));
    v.push((
        Instr::FpaDyadic(FpaDyadicInstr {
            op: FpaDyadicOp::Adf,
            cond: Cond::Al,
            size: FpaSize::Double,
            rounding: FpaRounding::Zero,
            dest: FReg(1),
            op1: FReg(2),
            op2: FpaOp2::Reg(FReg(3)),
        }),
        Fpa,
    ));
    v.push((
        Instr::FpaMonadic(FpaMonadicInstr {
            op: FpaMonadicOp::Sqt,
            cond: Cond::Al,
            size: FpaSize::Double,
            rounding: FpaRounding::Nearest,
            dest: FReg(1),
            op2: FpaOp2::Imm(0x9),
        }),
        Fpa,
    ));
    v.push((
        Instr::FpaStran(FpaStranInstr {
            op: StranOp::Ldr,
            cond: Cond::Al,
            size: FpaSize::Double,
            dest: FReg(2),
            base: Reg(11),
            offset: 0x14,
            pre_indexed: true,
            write_back: false,
            subtract: false,
        }),
        Fpa,
    ));
    v.push((
        Instr::FpaFlt(FpaFltInstr {
            cond: Cond::Al,
            rounding: FpaRounding::Nearest,
            size: FpaSize::Double,
            dest: FReg(0),
            src: Reg(3),
        }),
        Fpa,
    ));
    v.push((
        Instr::FpaFix(FpaFixInstr {
            cond: Cond::Al,
            rounding: FpaRounding::Zero,
            dest: Reg(3),
            op2: FpaOp2::Reg(FReg(0)),
        }),
        Fpa,
    ));
    for op in FpaCmpOp::iter() {
        v.push((
            Instr::FpaCmp(FpaCmpInstr {
                op,
                cond: Cond::Al,
                op1: FReg(1),
                op2: FpaOp2::Reg(FReg(2)),
            }),
            Fpa,
        ));
    }
    v.push((
        Instr::FpaCptran(FpaCptranInstr {
            op: FpaCptranOp::Rfs,
            cond: Cond::Al,
            dest: Reg(1),
        }),
        Fpa,
    ));

    for op in VfpDataOp::iter() {
        for precision in VfpPrecision::iter() {
            v.push((
                Instr::VfpData(VfpDataInstr {
                    op,
                    precision,
                    cond: Cond::Al,
                    dest: VReg(3),
                    op1: VReg(5),
                    op2: VReg(7),
                }),
                Vfp,
            ));
        }
    }
    for op in VfpCmpOp::iter() {
        let two_ops = matches!(op, VfpCmpOp::Cmp | VfpCmpOp::Cmpe);
        for precision in VfpPrecision::iter() {
            v.push((
                Instr::VfpCmp(VfpCmpInstr {
                    op,
                    precision,
                    cond: Cond::Al,
                    op1: VReg(3),
                    op2: VReg(if two_ops { 5 } else { 0 }),
                }),
                Vfp,
            ));
        }
    }
    for op in VfpCopyOp::iter() {
        v.push((
            Instr::VfpCopy(VfpCopyInstr {
                op,
                precision: VfpPrecision::S,
                cond: Cond::Al,
                dest: VReg(9),
                src: VReg(12),
            }),
            Vfp,
        ));
    }
    v.push((
        Instr::VfpSqrt(VfpSqrtInstr {
            precision: VfpPrecision::D,
            cond: Cond::Al,
            dest: VReg(4),
            op1: VReg(5),
        }),
        Vfp,
    ));
    for op in VfpTranOp::iter() {
        v.push((
            Instr::VfpTran(VfpTranInstr {
                op,
                use_dregs: false,
                cond: Cond::Al,
                dest: VReg(6),
                src: VReg(9),
            }),
            Vfp,
        ));
    }
    for (op, d1, d2, s1, s2) in [
        (VfpTranDblOp::Fmdrr, 4, 0, 1, 2),
        (VfpTranDblOp::Fmrrd, 1, 2, 4, 0),
        (VfpTranDblOp::Fmsrr, 6, 7, 1, 2),
        (VfpTranDblOp::Fmrrs, 1, 2, 6, 7),
    ] {
        v.push((
            Instr::VfpTranDbl(VfpTranDblInstr {
                op,
                cond: Cond::Al,
                dest1: VReg(d1),
                dest2: VReg(d2),
                src1: VReg(s1),
                src2: VReg(s2),
            }),
            Vfp,
        ));
    }
    v.push((
        Instr::VfpCptran(VfpCptranInstr {
            op: VfpCptranOp::Fmsr,
            use_dregs: false,
            cond: Cond::Al,
            dest: VReg(11),
            src: VReg(2),
        }),
        Vfp,
    ));
    v.push((
        Instr::VfpCptran(VfpCptranInstr {
            op: VfpCptranOp::Fmrs,
            use_dregs: false,
            cond: Cond::Al,
            dest: VReg(2),
            src: VReg(11),
        }),
        Vfp,
    ));
    for sysreg in VfpSysreg::iter() {
        v.push((
            Instr::VfpSysreg(VfpSysregInstr {
                op: VfpSysregOp::Fmrx,
                cond: Cond::Al,
                sysreg,
                arm_reg: Reg(3),
            }),
            Vfp,
        ));
    }
    v.push((
        Instr::VfpCvt(VfpCvtInstr {
            op: VfpCvtOp::Fcvtds,
            cond: Cond::Al,
            dest: VReg(4),
            op1: VReg(9),
        }),
        Vfp,
    ));
    v.push((
        Instr::VfpCvt(VfpCvtInstr {
            op: VfpCvtOp::Fcvtsd,
            cond: Cond::Al,
            dest: VReg(9),
            op1: VReg(4),
        }),
        Vfp,
    ));
    for op in VfpStranOp::iter() {
        v.push((
            Instr::VfpStran(VfpStranInstr {
                op,
                cond: Cond::Al,
                dest: VReg(7),
                base: Reg(10),
                offset: 0x21,
                pre_indexed: true,
                write_back: false,
                subtract: false,
            }),
            Vfp,
        ));
    }
    for op in SimdOp::iter() {
        v.push((
            Instr::Simd(SimdInstr {
                op,
                cond: Cond::Al,
                dest: Reg(1),
                op1: Reg(2),
                op2: Reg(3),
            }),
            Fpa,
        ));
    }
    for op in SignxOp::iter() {
        for rotate in SignxRotation::iter() {
            v.push((
                Instr::Signx(SignxInstr {
                    op,
                    cond: Cond::Al,
                    rotate,
                    dest: Reg(1),
                    op1: Reg(2),
                }),
                Fpa,
            ));
        }
    }
    v
}

#[test]
fn round_trip_all_classes() {
    for (instr, model) in sample_instructions() {
        let word = encode(&instr)
            .unwrap_or_else(|e| panic!("{instr:?} failed to encode: {e}"));
        let back = disass(word, model)
            .unwrap_or_else(|e| panic!("{instr:?} -> {word:#010x} failed to decode: {e}"));
        assert_eq!(back, instr, "word {word:#010x}");
    }
}

#[test]
fn every_instruction_is_one_word() {
    // Single-word property; trivially true of the encoder's type, but
    // the byte views must agree with it too.
    for (instr, _) in sample_instructions() {
        let word = encode(&instr).unwrap();
        assert_eq!(word.to_le_bytes().len(), INSTR_LEN);
    }
}

#[test]
fn undecodable_words_are_refused() {
    // Coprocessor register moves outside the FPA and VFP patterns.
    for model in [FloatModel::Fpa, FloatModel::Vfp] {
        let word = 0xEE40_0010;
        assert_eq!(disass(word, model), Err(Error::BadInstruction(word)));
    }
}

#[test]
fn conditions_round_trip() {
    use strum::IntoEnumIterator;
    for cond in Cond::iter() {
        let instr = Instr::Swi(SwiInstr { cond, code: 0x42 });
        let word = encode(&instr).unwrap();
        assert_eq!(disass(word, FloatModel::Fpa).unwrap(), instr);
    }
}

#[test]
fn dump_renders_unknown_words_as_data() {
    let mut code = Vec::new();
    code.extend_from_slice(&0xE281_0001u32.to_le_bytes());
    code.extend_from_slice(&0xEE00_0500u32.to_le_bytes());
    code.push(0x42);
    let listing = dump(&code, FloatModel::Fpa, 0x8000);
    assert!(listing.contains("ADD"));
    assert!(listing.contains("DCW &EE000500"));
    assert!(listing.contains("DCB &42"));
}

#[cfg(feature = "serde")]
#[test]
fn serde_round_trip() {
    for (instr, _) in sample_instructions() {
        let bytes = bincode::serialize(&instr).expect("serialize");
        let back: Instr = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(back, instr);
    }
}

proptest! {
    /// Decoding is idempotent: whatever a decoded record re-encodes
    /// to must decode to the same record.
    #[test]
    fn decode_encode_decode_is_stable(word in any::<u32>()) {
        for model in [FloatModel::Fpa, FloatModel::Vfp] {
            if let Ok(instr) = disass(word, model) {
                if let Ok(word2) = encode(&instr) {
                    let again = disass(word2, model).expect("re-decode");
                    prop_assert_eq!(again, instr);
                }
            }
        }
    }

    /// Data-processing records with in-range fields always round-trip.
    #[test]
    fn data_processing_round_trip(
        op_idx in 0u32..16,
        dest in 0u8..16,
        op1 in 0u8..16,
        imm in 0u32..0x1000,
        status in any::<bool>(),
    ) {
        let instr = Instr::Data(DataInstr {
            op: DataOp::from_bits(op_idx),
            cond: Cond::Al,
            status,
            dest: Reg(dest),
            op1: Reg(op1),
            op2: Op2::Imm(imm),
        });
        let word = encode(&instr).unwrap();
        prop_assert_eq!(disass(word, FloatModel::Fpa).unwrap(), instr);
    }
}
