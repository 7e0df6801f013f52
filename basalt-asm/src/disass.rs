//! 32-bit word → instruction record.
//!
//! Classification is a cascade of field-mask tests in a fixed order;
//! the first match wins. Coprocessor space is decoded according to the
//! float model the program was compiled for, since FPA and VFP overlap.

use crate::encode::SIMD_BASE_WORDS;
use crate::instr::*;
use crate::{Cond, Error, FReg, Op2, Reg, RegList, Shift, ShiftCount, ShiftKind, VReg};

/// Which floating point instruction set the decoder should assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FloatModel {
    /// The floating point accelerator of the ARM2/ARM3 era machines.
    Fpa,
    /// VFPv2.
    Vfp,
}

const SHIFT_KINDS: [ShiftKind; 4] =
    [ShiftKind::Lsl, ShiftKind::Lsr, ShiftKind::Asr, ShiftKind::Ror];

fn reg(word: u32, shift: u32) -> Reg {
    Reg(((word >> shift) & 0xf) as u8)
}

fn freg(word: u32, shift: u32) -> FReg {
    FReg(((word >> shift) & 0x7) as u8)
}

/// A single-precision register from the low operand position.
fn vfp_s_lo(word: u32) -> VReg {
    VReg((((word & 0xf) << 1) | ((word >> 5) & 1)) as u8)
}

/// A single-precision register from the destination position.
fn vfp_s_dest(word: u32) -> VReg {
    VReg((((word >> 11) & 0x1e) | ((word >> 22) & 1)) as u8)
}

/// A single-precision register from the first-operand position.
fn vfp_s_op1(word: u32) -> VReg {
    VReg((((word >> 15) & 0x1e) | ((word >> 7) & 1)) as u8)
}

fn decode_shift_count(word: u32) -> ShiftCount {
    if word & (1 << 4) != 0 {
        ShiftCount::Reg(reg(word, 8))
    } else {
        let n = ((word >> 7) & 0x1f) as u8;
        ShiftCount::Imm(if n == 0 { 32 } else { n })
    }
}

fn decode_data_op2(word: u32) -> Op2 {
    if word & (1 << 25) != 0 {
        Op2::Imm(word & 0xfff)
    } else if word & 0xff0 != 0 {
        Op2::Shifted(Shift {
            reg: reg(word, 0),
            kind: SHIFT_KINDS[((word >> 5) & 3) as usize],
            count: decode_shift_count(word),
        })
    } else {
        Op2::Reg(reg(word, 0))
    }
}

/// Single-transfer offsets invert the meaning of bit 25 and never use
/// register shift counts.
fn decode_stran_op2(word: u32) -> Op2 {
    if word & (1 << 25) != 0 {
        if word & 0xff0 != 0 {
            let n = ((word >> 7) & 0x1f) as u8;
            Op2::Shifted(Shift {
                reg: reg(word, 0),
                kind: SHIFT_KINDS[((word >> 5) & 3) as usize],
                count: ShiftCount::Imm(if n == 0 { 32 } else { n }),
            })
        } else {
            Op2::Reg(reg(word, 0))
        }
    } else {
        Op2::Imm(word & 0xfff)
    }
}

fn decode_mul(word: u32) -> Instr {
    Instr::Mul(MulInstr {
        cond: Cond::from_word(word),
        status: word & (1 << 20) != 0,
        dest: reg(word, 16),
        rm: reg(word, 0),
        rs: reg(word, 8),
        acc: (word & (1 << 21) != 0).then(|| reg(word, 12)),
    })
}

fn decode_swi(word: u32) -> Instr {
    Instr::Swi(SwiInstr {
        cond: Cond::from_word(word),
        code: word & 0xff_ffff,
    })
}

fn decode_branch(word: u32) -> Instr {
    let mut offset = (word & 0xff_ffff) as i32;
    if word & 0x80_0000 != 0 {
        offset = (word | 0xff00_0000) as i32;
    }
    Instr::Br(BrInstr {
        cond: Cond::from_word(word),
        link: word & (1 << 24) != 0,
        target: BranchTarget::Offset(offset),
    })
}

fn decode_mtran(word: u32) -> Result<Instr, Error> {
    // User-bank transfers are not part of the model.
    if word & (1 << 22) != 0 {
        return Err(Error::BadInstruction(word));
    }
    let mode = match ((word >> 23) & 1, (word >> 24) & 1) {
        (1, 1) => MtranMode::Ib,
        (1, 0) => MtranMode::Ia,
        (0, 1) => MtranMode::Db,
        _ => MtranMode::Da,
    };
    Ok(Instr::Mtran(MtranInstr {
        op: if word & (1 << 20) != 0 {
            MtranOp::Ldm
        } else {
            MtranOp::Stm
        },
        cond: Cond::from_word(word),
        op0: reg(word, 16),
        regs: RegList::from_bits_truncate((word & 0xffff) as u16),
        mode,
        write_back: word & (1 << 21) != 0,
        status: false,
    }))
}

fn decode_stran(word: u32) -> Instr {
    Instr::Stran(StranInstr {
        op: if word & (1 << 20) != 0 {
            StranOp::Ldr
        } else {
            StranOp::Str
        },
        cond: Cond::from_word(word),
        pre_indexed: word & (1 << 24) != 0,
        byte: word & (1 << 22) != 0,
        write_back: word & (1 << 21) != 0,
        subtract: word & (1 << 23) == 0,
        dest: reg(word, 12),
        base: reg(word, 16),
        offset: decode_stran_op2(word),
    })
}

fn decode_data(word: u32) -> Instr {
    Instr::Data(DataInstr {
        op: DataOp::from_bits(word >> 21),
        cond: Cond::from_word(word),
        status: word & (1 << 20) != 0,
        dest: reg(word, 12),
        op1: reg(word, 16),
        op2: decode_data_op2(word),
    })
}

fn decode_mrs(word: u32) -> Instr {
    Instr::Flags(FlagsInstr {
        op: FlagsOp::Mrs,
        cond: Cond::from_word(word),
        flag_reg: if word & (1 << 22) != 0 {
            StatusReg::Spsr
        } else {
            StatusReg::Cpsr
        },
        fields: 0,
        operand: FlagsOperand::Reg(reg(word, 12)),
    })
}

fn decode_msr(word: u32) -> Instr {
    Instr::Flags(FlagsInstr {
        op: FlagsOp::Msr,
        cond: Cond::from_word(word),
        flag_reg: if word & (1 << 22) != 0 {
            StatusReg::Spsr
        } else {
            StatusReg::Cpsr
        },
        fields: (word >> 16) & 0xf,
        operand: if word & (1 << 25) != 0 {
            FlagsOperand::Imm(word & 0xfff)
        } else {
            FlagsOperand::Reg(reg(word, 0))
        },
    })
}

fn decode_stran_misc(word: u32) -> Result<Instr, Error> {
    let kind = ((word & (1 << 20)) >> 18) | ((word >> 5) & 3);
    let (op, width) = match kind {
        1 => (StranOp::Str, MiscWidth::H),
        2 => (StranOp::Ldr, MiscWidth::D),
        3 => (StranOp::Str, MiscWidth::D),
        5 => (StranOp::Ldr, MiscWidth::H),
        6 => (StranOp::Ldr, MiscWidth::Sb),
        7 => (StranOp::Ldr, MiscWidth::Sh),
        _ => return Err(Error::BadInstruction(word)),
    };
    // Bit 22 selects the split-immediate offset form.
    let offset = if word & (1 << 22) != 0 {
        MiscOffset::Imm(((word & 0xf) | ((word >> 4) & 0xf0)) as u8)
    } else {
        MiscOffset::Reg(reg(word, 0))
    };
    Ok(Instr::StranMisc(StranMiscInstr {
        op,
        cond: Cond::from_word(word),
        width,
        pre_indexed: word & (1 << 24) != 0,
        write_back: word & (1 << 21) != 0,
        subtract: word & (1 << 23) == 0,
        dest: reg(word, 12),
        base: reg(word, 16),
        offset,
    }))
}

fn decode_signx(word: u32) -> Option<Instr> {
    let op = match word & 0x0fff_03f0 {
        0x06af_0070 => SignxOp::Sxtb,
        0x068f_0070 => SignxOp::Sxtb16,
        0x06bf_0070 => SignxOp::Sxth,
        _ => return None,
    };
    let rotate = match (word >> 10) & 3 {
        0 => SignxRotation::None,
        1 => SignxRotation::Ror8,
        2 => SignxRotation::Ror16,
        _ => SignxRotation::Ror24,
    };
    Some(Instr::Signx(SignxInstr {
        op,
        cond: Cond::from_word(word),
        rotate,
        dest: reg(word, 12),
        op1: reg(word, 0),
    }))
}

fn decode_simd(word: u32) -> Option<Instr> {
    const SIMD_OPS: [SimdOp; 36] = [
        SimdOp::Qadd16,
        SimdOp::Qadd8,
        SimdOp::Qaddsubx,
        SimdOp::Qsub16,
        SimdOp::Qsub8,
        SimdOp::Qsubaddx,
        SimdOp::Sadd16,
        SimdOp::Sadd8,
        SimdOp::Saddsubx,
        SimdOp::Ssub16,
        SimdOp::Ssub8,
        SimdOp::Ssubaddx,
        SimdOp::Shadd16,
        SimdOp::Shadd8,
        SimdOp::Shaddsubx,
        SimdOp::Shsub16,
        SimdOp::Shsub8,
        SimdOp::Shsubaddx,
        SimdOp::Uadd16,
        SimdOp::Uadd8,
        SimdOp::Uaddsubx,
        SimdOp::Usub16,
        SimdOp::Usub8,
        SimdOp::Usubaddx,
        SimdOp::Uhadd16,
        SimdOp::Uhadd8,
        SimdOp::Uhaddsubx,
        SimdOp::Uhsub16,
        SimdOp::Uhsub8,
        SimdOp::Uhsubaddx,
        SimdOp::Uqadd16,
        SimdOp::Uqadd8,
        SimdOp::Uqaddsubx,
        SimdOp::Uqsub16,
        SimdOp::Uqsub8,
        SimdOp::Uqsubaddx,
    ];
    let sig = word & 0x0ff0_00f0;
    let idx = SIMD_BASE_WORDS.iter().position(|&base| base == sig)?;
    Some(Instr::Simd(SimdInstr {
        op: SIMD_OPS[idx],
        cond: Cond::from_word(word),
        dest: reg(word, 12),
        op1: reg(word, 16),
        op2: reg(word, 0),
    }))
}

// --- FPA -----------------------------------------------------------------

fn fpa_rounding(word: u32) -> FpaRounding {
    match (word >> 5) & 3 {
        0 => FpaRounding::Nearest,
        1 => FpaRounding::PlusInfinity,
        2 => FpaRounding::MinusInfinity,
        _ => FpaRounding::Zero,
    }
}

fn fpa_op2(word: u32) -> FpaOp2 {
    if word & (1 << 3) != 0 {
        FpaOp2::Imm((word & 0xf) as u8)
    } else {
        FpaOp2::Reg(freg(word, 0))
    }
}

fn fpa_data_size(word: u32) -> Result<FpaSize, Error> {
    match ((word >> 18) & 2) | ((word >> 7) & 1) {
        0 => Ok(FpaSize::Single),
        1 => Ok(FpaSize::Double),
        2 => Ok(FpaSize::Extended),
        _ => Err(Error::BadInstruction(word)),
    }
}

fn decode_fpa_data(word: u32) -> Result<Instr, Error> {
    const DYADIC: [Option<FpaDyadicOp>; 16] = [
        Some(FpaDyadicOp::Adf),
        Some(FpaDyadicOp::Muf),
        Some(FpaDyadicOp::Suf),
        Some(FpaDyadicOp::Rsf),
        Some(FpaDyadicOp::Dvf),
        Some(FpaDyadicOp::Rdf),
        Some(FpaDyadicOp::Pow),
        Some(FpaDyadicOp::Rpw),
        Some(FpaDyadicOp::Rmf),
        Some(FpaDyadicOp::Fml),
        Some(FpaDyadicOp::Fdv),
        Some(FpaDyadicOp::Frd),
        Some(FpaDyadicOp::Pol),
        None,
        None,
        None,
    ];
    const MONADIC: [Option<FpaMonadicOp>; 16] = [
        Some(FpaMonadicOp::Mvf),
        Some(FpaMonadicOp::Mnf),
        Some(FpaMonadicOp::Abs),
        Some(FpaMonadicOp::Rnd),
        Some(FpaMonadicOp::Sqt),
        Some(FpaMonadicOp::Log),
        Some(FpaMonadicOp::Lgn),
        Some(FpaMonadicOp::Exp),
        Some(FpaMonadicOp::Sin),
        Some(FpaMonadicOp::Cos),
        Some(FpaMonadicOp::Tan),
        Some(FpaMonadicOp::Asn),
        Some(FpaMonadicOp::Acs),
        Some(FpaMonadicOp::Atn),
        Some(FpaMonadicOp::Urd),
        Some(FpaMonadicOp::Nrm),
    ];

    let opcode = ((word >> 20) & 0xf) as usize;
    let monadic = word & (1 << 15) != 0;
    let cond = Cond::from_word(word);
    let size = fpa_data_size(word)?;
    let rounding = fpa_rounding(word);
    let dest = freg(word, 12);
    let op2 = fpa_op2(word);

    if monadic {
        let op = MONADIC[opcode].ok_or(Error::BadInstruction(word))?;
        Ok(Instr::FpaMonadic(FpaMonadicInstr {
            op,
            cond,
            size,
            rounding,
            dest,
            op2,
        }))
    } else {
        let op = DYADIC[opcode].ok_or(Error::BadInstruction(word))?;
        Ok(Instr::FpaDyadic(FpaDyadicInstr {
            op,
            cond,
            size,
            rounding,
            dest,
            op1: freg(word, 16),
            op2,
        }))
    }
}

fn decode_fpa_stran(word: u32) -> Result<Instr, Error> {
    let size = match ((word >> 21) & 2) | ((word >> 15) & 1) {
        0 => FpaSize::Single,
        1 => FpaSize::Double,
        2 => FpaSize::Extended,
        _ => return Err(Error::BadInstruction(word)),
    };
    Ok(Instr::FpaStran(FpaStranInstr {
        op: if word & (1 << 20) != 0 {
            StranOp::Ldr
        } else {
            StranOp::Str
        },
        cond: Cond::from_word(word),
        size,
        dest: freg(word, 12),
        base: reg(word, 16),
        offset: (word & 0xff) as u8,
        pre_indexed: word & (1 << 24) != 0,
        write_back: word & (1 << 21) != 0,
        subtract: word & (1 << 23) == 0,
    }))
}

fn decode_fpa_cmp(word: u32) -> Result<Instr, Error> {
    let op = match (word >> 21) & 0x7 {
        4 => FpaCmpOp::Cmf,
        5 => FpaCmpOp::Cnf,
        6 => FpaCmpOp::Cmfe,
        7 => FpaCmpOp::Cnfe,
        _ => return Err(Error::BadInstruction(word)),
    };
    Ok(Instr::FpaCmp(FpaCmpInstr {
        op,
        cond: Cond::from_word(word),
        op1: freg(word, 16),
        op2: fpa_op2(word),
    }))
}

fn decode_fpa_tran(word: u32) -> Result<Instr, Error> {
    match (word >> 20) & 0xf {
        0 => Ok(Instr::FpaFlt(FpaFltInstr {
            cond: Cond::from_word(word),
            rounding: fpa_rounding(word),
            size: fpa_data_size(word)?,
            dest: freg(word, 16),
            src: reg(word, 12),
        })),
        1 => Ok(Instr::FpaFix(FpaFixInstr {
            cond: Cond::from_word(word),
            rounding: fpa_rounding(word),
            dest: reg(word, 12),
            op2: fpa_op2(word),
        })),
        _ => Err(Error::BadInstruction(word)),
    }
}

fn decode_fpa_cptran(word: u32, group: u32) -> Instr {
    Instr::FpaCptran(FpaCptranInstr {
        op: if group == 2 {
            FpaCptranOp::Wfs
        } else {
            FpaCptranOp::Rfs
        },
        cond: Cond::from_word(word),
        dest: reg(word, 12),
    })
}

fn decode_fpa(word: u32) -> Option<Result<Instr, Error>> {
    let group = (word >> 25) & 7;
    if group == 6 {
        return Some(decode_fpa_stran(word));
    }
    if group == 7 {
        if word & (1 << 4) == 0 {
            return Some(decode_fpa_data(word));
        }
        if (word >> 12) & 0xf == 0xf {
            return Some(decode_fpa_cmp(word));
        }
        let group = (word >> 20) & 7;
        if group <= 1 {
            return Some(decode_fpa_tran(word));
        }
        if group == 2 || group == 3 {
            return Some(Ok(decode_fpa_cptran(word, group)));
        }
    }
    None
}

// --- VFP -----------------------------------------------------------------

fn decode_vfp_cvt(word: u32) -> Instr {
    if word & 0x100 != 0 {
        Instr::VfpCvt(VfpCvtInstr {
            op: VfpCvtOp::Fcvtsd,
            cond: Cond::from_word(word),
            op1: VReg((word & 0xf) as u8),
            dest: vfp_s_dest(word),
        })
    } else {
        Instr::VfpCvt(VfpCvtInstr {
            op: VfpCvtOp::Fcvtds,
            cond: Cond::from_word(word),
            op1: vfp_s_lo(word),
            dest: VReg(((word >> 12) & 0xf) as u8),
        })
    }
}

fn decode_vfp_sysreg(word: u32) -> Result<Instr, Error> {
    let sysreg = match (word >> 16) & 0xf {
        0 => VfpSysreg::Fpsid,
        1 => VfpSysreg::Fpscr,
        8 => VfpSysreg::Fpexc,
        _ => return Err(Error::BadInstruction(word)),
    };
    if (word >> 7) & 1 != 0 {
        return Err(Error::BadInstruction(word));
    }
    Ok(Instr::VfpSysreg(VfpSysregInstr {
        op: if (word >> 20) & 1 != 0 {
            VfpSysregOp::Fmrx
        } else {
            VfpSysregOp::Fmxr
        },
        cond: Cond::from_word(word),
        sysreg,
        arm_reg: reg(word, 12),
    }))
}

fn decode_vfp_cptran(word: u32) -> Result<Instr, Error> {
    let cond = Cond::from_word(word);
    let s_reg = VReg((((word >> 15) & 0x1e) | ((word >> 7) & 1)) as u8);
    match (word >> 20) & 0xf {
        0 => Ok(Instr::VfpCptran(VfpCptranInstr {
            op: VfpCptranOp::Fmsr,
            use_dregs: false,
            cond,
            src: VReg(((word >> 12) & 0xf) as u8),
            dest: s_reg,
        })),
        1 => Ok(Instr::VfpCptran(VfpCptranInstr {
            op: VfpCptranOp::Fmrs,
            use_dregs: false,
            cond,
            dest: VReg(((word >> 12) & 0xf) as u8),
            src: s_reg,
        })),
        _ => Err(Error::BadInstruction(word)),
    }
}

fn decode_vfp_tran_dbl(word: u32) -> Result<Instr, Error> {
    let cond = Cond::from_word(word);
    let instr = match word & 0x0ff0_0f00 {
        0x0c40_0b00 => VfpTranDblInstr {
            op: VfpTranDblOp::Fmdrr,
            cond,
            dest1: VReg((word & 0xf) as u8),
            dest2: VReg(0),
            src1: VReg(((word >> 12) & 0xf) as u8),
            src2: VReg(((word >> 16) & 0xf) as u8),
        },
        0x0c50_0b00 => VfpTranDblInstr {
            op: VfpTranDblOp::Fmrrd,
            cond,
            dest1: VReg(((word >> 12) & 0xf) as u8),
            dest2: VReg(((word >> 16) & 0xf) as u8),
            src1: VReg((word & 0xf) as u8),
            src2: VReg(0),
        },
        0x0c50_0a00 => {
            let src1 = vfp_s_lo(word);
            VfpTranDblInstr {
                op: VfpTranDblOp::Fmrrs,
                cond,
                dest1: VReg(((word >> 12) & 0xf) as u8),
                dest2: VReg(((word >> 16) & 0xf) as u8),
                src1,
                src2: VReg(src1.0 + 1),
            }
        }
        0x0c40_0a00 => {
            let dest1 = vfp_s_lo(word);
            VfpTranDblInstr {
                op: VfpTranDblOp::Fmsrr,
                cond,
                dest1,
                dest2: VReg(dest1.0 + 1),
                src1: VReg(((word >> 12) & 0xf) as u8),
                src2: VReg(((word >> 16) & 0xf) as u8),
            }
        }
        _ => return Err(Error::BadInstruction(word)),
    };
    Ok(Instr::VfpTranDbl(instr))
}

fn decode_vfp_stran(word: u32) -> Result<Instr, Error> {
    let dbl = (word >> 8) & 0xf == 0xb;
    let (op, dest) = if dbl {
        if (word >> 22) & 1 != 0 {
            return Err(Error::BadInstruction(word));
        }
        let op = if word & (1 << 20) != 0 {
            VfpStranOp::Fldd
        } else {
            VfpStranOp::Fstd
        };
        (op, VReg(((word >> 12) & 0xf) as u8))
    } else {
        let op = if word & (1 << 20) != 0 {
            VfpStranOp::Flds
        } else {
            VfpStranOp::Fsts
        };
        (op, vfp_s_dest(word))
    };
    Ok(Instr::VfpStran(VfpStranInstr {
        op,
        cond: Cond::from_word(word),
        dest,
        base: reg(word, 16),
        offset: (word & 0xff) as u8,
        pre_indexed: word & (1 << 24) != 0,
        write_back: word & (1 << 21) != 0,
        subtract: word & (1 << 23) == 0,
    }))
}

fn decode_vfp_ext(word: u32, dbl: bool) -> Result<Instr, Error> {
    let cond = Cond::from_word(word);
    let opcode = (word >> 16) & 0xf;
    let n = (word >> 7) & 1;
    let precision = if dbl { VfpPrecision::D } else { VfpPrecision::S };

    let (dest, src) = if dbl {
        (
            VReg(((word >> 12) & 0xf) as u8),
            VReg((word & 0xf) as u8),
        )
    } else {
        (vfp_s_dest(word), vfp_s_lo(word))
    };

    match (opcode, n) {
        (0, 0) => Ok(Instr::VfpCopy(VfpCopyInstr {
            op: VfpCopyOp::Cpy,
            precision,
            cond,
            dest,
            src,
        })),
        (0, 1) => Ok(Instr::VfpCopy(VfpCopyInstr {
            op: VfpCopyOp::Abs,
            precision,
            cond,
            dest,
            src,
        })),
        (1, 0) => Ok(Instr::VfpCopy(VfpCopyInstr {
            op: VfpCopyOp::Neg,
            precision,
            cond,
            dest,
            src,
        })),
        (1, 1) => Ok(Instr::VfpSqrt(VfpSqrtInstr {
            precision,
            cond,
            dest,
            op1: src,
        })),
        (4, _) | (5, _) => {
            let op = match (opcode, n) {
                (4, 0) => VfpCmpOp::Cmp,
                (4, 1) => VfpCmpOp::Cmpe,
                (5, 0) => VfpCmpOp::Cmpz,
                _ => VfpCmpOp::Cmpez,
            };
            let (op1, op2) = if dbl {
                (VReg(((word >> 12) & 0xf) as u8), VReg((word & 0xf) as u8))
            } else {
                (vfp_s_dest(word), vfp_s_lo(word))
            };
            Ok(Instr::VfpCmp(VfpCmpInstr {
                op,
                precision,
                cond,
                op1,
                op2: if matches!(op, VfpCmpOp::Cmpz | VfpCmpOp::Cmpez) {
                    VReg(0)
                } else {
                    op2
                },
            }))
        }
        (8, _) | (12, _) | (13, _) => {
            use VfpTranOp::*;
            let op = if dbl {
                match (opcode, n) {
                    (8, 1) => Fsitod,
                    (8, 0) => Fuitod,
                    (12, 1) => Ftouizd,
                    (12, 0) => Ftouid,
                    (13, 1) => Ftosizd,
                    _ => Ftosid,
                }
            } else {
                match (opcode, n) {
                    (8, 1) => Fsitos,
                    (8, 0) => Fuitos,
                    (12, 1) => Ftouizs,
                    (12, 0) => Ftouis,
                    (13, 1) => Ftosizs,
                    _ => Ftosis,
                }
            };
            // The integer always travels in a single-precision
            // register, whichever precision the float side has.
            let (dest, src) = match op {
                Fsitod | Fuitod => (VReg(((word >> 12) & 0xf) as u8), vfp_s_lo(word)),
                Ftosid | Ftouid | Ftosizd | Ftouizd => {
                    (vfp_s_dest(word), VReg((word & 0xf) as u8))
                }
                _ => (vfp_s_dest(word), vfp_s_lo(word)),
            };
            Ok(Instr::VfpTran(VfpTranInstr {
                op,
                use_dregs: false,
                cond,
                dest,
                src,
            }))
        }
        _ => Err(Error::BadInstruction(word)),
    }
}

fn decode_vfp_data(word: u32) -> Result<Instr, Error> {
    let opcode =
        ((word >> 6) & 1) | ((word >> 19) & 6) | ((word >> 20) & 8);
    let dbl = (word >> 8) & 0xf == 0xb;
    let op = match opcode {
        0 => VfpDataOp::Mac,
        1 => VfpDataOp::Nmac,
        2 => VfpDataOp::Msc,
        3 => VfpDataOp::Nmsc,
        4 => VfpDataOp::Mul,
        5 => VfpDataOp::Nmul,
        6 => VfpDataOp::Add,
        7 => VfpDataOp::Sub,
        8 => VfpDataOp::Div,
        15 => return decode_vfp_ext(word, dbl),
        _ => return Err(Error::BadInstruction(word)),
    };
    let (dest, op1, op2) = if dbl {
        (
            VReg(((word >> 12) & 0xf) as u8),
            VReg(((word >> 16) & 0xf) as u8),
            VReg((word & 0xf) as u8),
        )
    } else {
        (vfp_s_dest(word), vfp_s_op1(word), vfp_s_lo(word))
    };
    Ok(Instr::VfpData(VfpDataInstr {
        op,
        precision: if dbl { VfpPrecision::D } else { VfpPrecision::S },
        cond: Cond::from_word(word),
        dest,
        op1,
        op2,
    }))
}

fn decode_vfp(word: u32) -> Option<Result<Instr, Error>> {
    if word & 0x0eb7_0ac0 == 0x0eb7_0ac0 {
        return Some(Ok(decode_vfp_cvt(word)));
    }
    if word & 0x0f00_0a10 == 0x0e00_0a10 {
        if (word >> 21) & 0x7 == 0x7 {
            return Some(decode_vfp_sysreg(word));
        }
        return Some(decode_vfp_cptran(word));
    }
    if word & 0x0f40_0af0 == 0x0c40_0a10 {
        return Some(decode_vfp_tran_dbl(word));
    }
    if word & 0x0e00_0000 == 0x0c00_0000
        && matches!(word & 0xf00, 0xa00 | 0xb00)
    {
        return Some(decode_vfp_stran(word));
    }
    if word & 0x0e00_0a00 == 0x0e00_0a00 || word & 0x0e00_0b00 == 0x0e00_0b00 {
        return Some(decode_vfp_data(word));
    }
    None
}

/// Decode a 32-bit word into an instruction record.
pub fn disass(word: u32, float_model: FloatModel) -> Result<Instr, Error> {
    if word & (0x3f << 22) == 0 && (word >> 4) & 0xf == 9 {
        return Ok(decode_mul(word));
    }

    if word & (0xf << 24) == 0x0f00_0000 {
        return Ok(decode_swi(word));
    }

    let class = (word >> 25) & 0x7;
    if class == 5 {
        return Ok(decode_branch(word));
    }
    if class == 4 {
        return decode_mtran(word);
    }

    // The v6 media space (011 with bit 4 set) collides with the
    // register-offset load/store pattern and must be tried first.
    if word & 0x0e00_0010 == 0x0600_0010 {
        if let Some(instr) = decode_signx(word) {
            return Ok(instr);
        }
        if let Some(instr) = decode_simd(word) {
            return Ok(instr);
        }
    }

    let class2 = (word >> 26) & 0x3;
    if class2 == 1 {
        return Ok(decode_stran(word));
    }

    if word & 0x0fbf_0fff == 1 << 24 {
        return Ok(decode_mrs(word));
    }
    if word & 0x0db0_f000 == 0x0120_0000 {
        return Ok(decode_msr(word));
    }

    if (word & 0x0e40_0090 == 0x40_0090 || word & 0x0e40_0f90 == 0x90)
        && word & 0x60 != 0
    {
        return decode_stran_misc(word);
    }

    if class2 == 0 {
        return Ok(decode_data(word));
    }

    let fp = match float_model {
        FloatModel::Fpa => decode_fpa(word),
        FloatModel::Vfp => decode_vfp(word),
    };
    if let Some(result) = fp {
        return result;
    }

    Err(Error::BadInstruction(word))
}
