//! Instruction record → 32-bit word.
//!
//! One function per instruction class. Each validates its operands and
//! produces exactly one word; the section encoder in `basalt-codegen`
//! calls these while streaming and handles the pseudo-instructions that
//! need label or pool context.

use crate::instr::*;
use crate::{Cond, Error, Instr, Op2, Shift, ShiftCount, ShiftKind, VReg};

fn shift_bits(kind: ShiftKind) -> Result<u32, Error> {
    match kind {
        ShiftKind::Lsl => Ok(0),
        ShiftKind::Lsr => Ok(1),
        ShiftKind::Asr => Ok(2),
        ShiftKind::Ror => Ok(3),
        ShiftKind::Rrx => Err(Error::Assertion("RRX reached the word encoder")),
    }
}

fn data_op2_bits(op2: &Op2) -> Result<u32, Error> {
    match *op2 {
        Op2::Reg(reg) => reg.field("op2 register"),
        Op2::Imm(imm) => {
            if imm & 0xffff_f000 != 0 {
                return Err(Error::OutOfRange("data-processing immediate field"));
            }
            Ok(imm | (1 << 25))
        }
        Op2::Shifted(Shift { reg, kind, count }) => {
            let mut bits = reg.field("shifted op2 register")?;
            match count {
                ShiftCount::Reg(sr) => {
                    bits |= 1 << 4;
                    bits |= sr.field("shift-amount register")? << 8;
                }
                ShiftCount::Imm(n) => bits |= (u32::from(n) & 31) << 7,
            }
            Ok(bits | (shift_bits(kind)? << 5))
        }
    }
}

/// Encode a data-processing instruction.
pub fn data_word(instr: &DataInstr) -> Result<u32, Error> {
    let mut word = instr.cond.bits();
    word |= (instr.op as u32) << 21;
    if instr.status {
        word |= 1 << 20;
    }
    word |= instr.op1.field("data-processing op1")? << 16;
    word |= instr.dest.field("data-processing destination")? << 12;
    word |= data_op2_bits(&instr.op2)?;
    Ok(word)
}

/// Encode `MUL`/`MLA`.
pub fn mul_word(instr: &MulInstr) -> Result<u32, Error> {
    let mut word = 0x90 | instr.cond.bits();
    if let Some(rn) = instr.acc {
        word |= 1 << 21;
        word |= rn.field("multiply accumulator")? << 12;
    }
    if instr.status {
        word |= 1 << 20;
    }
    word |= instr.dest.field("multiply destination")? << 16;
    word |= instr.rs.field("multiply rs")? << 8;
    word |= instr.rm.field("multiply rm")?;
    Ok(word)
}

fn stran_offset_bits(offset: &Op2) -> Result<u32, Error> {
    match *offset {
        Op2::Reg(reg) => Ok((1 << 25) | reg.field("transfer offset register")?),
        Op2::Imm(imm) => {
            if imm > 4095 {
                return Err(Error::OutOfRange("transfer offset immediate"));
            }
            Ok(imm)
        }
        Op2::Shifted(Shift { reg, kind, count }) => {
            let mut bits = (1 << 25) | reg.field("transfer offset register")?;
            // Register-specified shift amounts do not exist in the
            // load/store encoding.
            let ShiftCount::Imm(n) = count else {
                return Err(Error::Assertion("register shift count in transfer offset"));
            };
            bits |= (u32::from(n) & 31) << 7;
            Ok(bits | (shift_bits(kind)? << 5))
        }
    }
}

/// Encode a single word/byte transfer.
pub fn stran_word(instr: &StranInstr) -> Result<u32, Error> {
    let mut word = instr.cond.bits() | (1 << 26);
    if instr.pre_indexed {
        word |= 1 << 24;
    }
    if instr.byte {
        word |= 1 << 22;
    }
    if instr.write_back {
        word |= 1 << 21;
    }
    if !instr.subtract {
        word |= 1 << 23;
    }
    if instr.op == StranOp::Ldr {
        word |= 1 << 20;
    }
    word |= instr.base.field("transfer base")? << 16;
    word |= instr.dest.field("transfer register")? << 12;
    word |= stran_offset_bits(&instr.offset)?;
    Ok(word)
}

/// Encode a halfword / signed byte / doubleword transfer.
pub fn stran_misc_word(instr: &StranMiscInstr) -> Result<u32, Error> {
    let mut word = 0x90 | instr.cond.bits();
    if instr.pre_indexed {
        word |= 1 << 24;
    }
    if instr.write_back {
        word |= 1 << 21;
    }
    if !instr.subtract {
        word |= 1 << 23;
    }
    word |= instr.base.field("transfer base")? << 16;
    word |= instr.dest.field("transfer register")? << 12;

    match instr.width {
        MiscWidth::Sb => {
            word |= 1 << 6;
            if instr.op == StranOp::Ldr {
                word |= 1 << 20;
            }
        }
        MiscWidth::Sh => {
            word |= (1 << 6) | (1 << 5);
            if instr.op == StranOp::Ldr {
                word |= 1 << 20;
            }
        }
        MiscWidth::H => {
            word |= 1 << 5;
            if instr.op == StranOp::Ldr {
                word |= 1 << 20;
            }
        }
        // LDRD/STRD encode the direction in bit 5, not bit 20.
        MiscWidth::D => {
            word |= 1 << 6;
            if instr.op == StranOp::Str {
                word |= 1 << 5;
            }
        }
    }

    match instr.offset {
        MiscOffset::Reg(reg) => word |= reg.field("misc transfer offset")?,
        MiscOffset::Imm(imm) => {
            word |= 1 << 22;
            word |= u32::from(imm) & 0xf;
            word |= (u32::from(imm) & 0xf0) << 4;
        }
    }
    Ok(word)
}

/// Encode a block transfer, converting the stack-oriented addressing
/// aliases by direction.
pub fn mtran_word(instr: &MtranInstr) -> Result<u32, Error> {
    let mut word = instr.cond.bits() | (0x4 << 25);

    let mode = match instr.op {
        MtranOp::Stm => match instr.mode {
            MtranMode::Fa => MtranMode::Ib,
            MtranMode::Fd => MtranMode::Db,
            MtranMode::Ea => MtranMode::Ia,
            MtranMode::Ed => MtranMode::Da,
            m => m,
        },
        MtranOp::Ldm => match instr.mode {
            MtranMode::Fa => MtranMode::Da,
            MtranMode::Fd => MtranMode::Ia,
            MtranMode::Ea => MtranMode::Db,
            MtranMode::Ed => MtranMode::Ib,
            m => m,
        },
    };
    match mode {
        MtranMode::Ia => word |= 1 << 23,
        MtranMode::Ib => word |= (1 << 23) | (1 << 24),
        MtranMode::Da => (),
        MtranMode::Db => word |= 1 << 24,
        _ => unreachable!("stack aliases converted above"),
    }

    if instr.write_back {
        word |= 1 << 21;
    }
    if instr.status {
        word |= 1 << 22;
    }
    if instr.op == MtranOp::Ldm {
        word |= 1 << 20;
    }
    word |= instr.op0.field("block transfer base")? << 16;
    word |= u32::from(instr.regs.bits());
    Ok(word)
}

/// Encode a branch whose target is already a raw offset, or an
/// indirect branch (`MOV pc, reg`). Label and section targets need the
/// section encoder.
pub fn branch_word(instr: &BrInstr) -> Result<u32, Error> {
    let mut word = instr.cond.bits();
    match instr.target {
        BranchTarget::Indirect(reg) => {
            word |= (DataOp::Mov as u32) << 21;
            word |= 15 << 12;
            word |= reg.field("indirect branch register")?;
        }
        BranchTarget::Offset(offset) => {
            word |= 0x5 << 25;
            if instr.link {
                word |= 1 << 24;
            }
            word |= (offset as u32) & 0xff_ffff;
        }
        BranchTarget::Label(_) | BranchTarget::Section(_) => {
            return Err(Error::NeedsSection("branch to label"));
        }
    }
    Ok(word)
}

/// Encode a software interrupt.
pub fn swi_word(instr: &SwiInstr) -> Result<u32, Error> {
    if instr.code > 0xff_ffff {
        return Err(Error::OutOfRange("SWI comment field"));
    }
    Ok(instr.cond.bits() | (0xf << 24) | instr.code)
}

/// Encode `MRS`/`MSR`.
pub fn flags_word(instr: &FlagsInstr) -> Result<u32, Error> {
    let mut word = match instr.op {
        FlagsOp::Mrs => {
            let FlagsOperand::Reg(reg) = instr.operand else {
                return Err(Error::Assertion("MRS needs a register destination"));
            };
            0x0100_0000 | (reg.field("MRS destination")? << 12)
        }
        FlagsOp::Msr => {
            let mut word = 0x0120_0000;
            match instr.operand {
                FlagsOperand::Reg(reg) => word |= reg.field("MSR source")?,
                FlagsOperand::Imm(imm) => {
                    if imm & 0xffff_f000 != 0 {
                        return Err(Error::OutOfRange("MSR immediate field"));
                    }
                    word |= (1 << 25) | imm;
                }
            }
            word | ((instr.fields & 0xf) << 16)
        }
    };
    if instr.flag_reg == StatusReg::Spsr {
        word |= 1 << 22;
    }
    Ok(word | instr.cond.bits())
}

// --- FPA -----------------------------------------------------------------

fn fpa_rounding_bits(rounding: FpaRounding) -> u32 {
    match rounding {
        FpaRounding::Nearest => 0,
        FpaRounding::PlusInfinity => 1 << 5,
        FpaRounding::MinusInfinity => 1 << 6,
        FpaRounding::Zero => 3 << 5,
    }
}

fn fpa_op2_bits(op2: &FpaOp2) -> Result<u32, Error> {
    match *op2 {
        FpaOp2::Reg(reg) => reg.field("FPA op2 register"),
        FpaOp2::Imm(imm) => Ok((1 << 3) | (u32::from(imm) & 0xf)),
    }
}

/// Data-op size field: bit 7 for double, bit 19 for extended.
fn fpa_data_size_bits(size: FpaSize) -> u32 {
    match size {
        FpaSize::Single => 0,
        FpaSize::Double => 1 << 7,
        FpaSize::Extended => 1 << 19,
    }
}

/// Encode a dyadic FPA data operation.
pub fn fpa_dyadic_word(instr: &FpaDyadicInstr) -> Result<u32, Error> {
    let mut word = instr.cond.bits() | (0xe << 24);
    word |= (instr.op as u32) << 20;
    word |= fpa_data_size_bits(instr.size);
    word |= instr.op1.field("FPA op1")? << 16;
    word |= instr.dest.field("FPA destination")? << 12;
    word |= 1 << 8;
    word |= fpa_rounding_bits(instr.rounding);
    word |= fpa_op2_bits(&instr.op2)?;
    Ok(word)
}

/// Encode a monadic FPA data operation.
pub fn fpa_monadic_word(instr: &FpaMonadicInstr) -> Result<u32, Error> {
    let mut word = instr.cond.bits() | (0xe << 24);
    word |= (instr.op as u32) << 20;
    word |= fpa_data_size_bits(instr.size);
    word |= 1 << 15;
    word |= instr.dest.field("FPA destination")? << 12;
    word |= 1 << 8;
    word |= fpa_rounding_bits(instr.rounding);
    word |= fpa_op2_bits(&instr.op2)?;
    Ok(word)
}

/// Encode `LDF`/`STF`.
pub fn fpa_stran_word(instr: &FpaStranInstr) -> Result<u32, Error> {
    let mut word = instr.cond.bits();
    word |= (0xc | u32::from(instr.pre_indexed)) << 24;
    if !instr.subtract {
        word |= 1 << 23;
    }
    match instr.size {
        FpaSize::Single => (),
        FpaSize::Double => word |= 1 << 15,
        FpaSize::Extended => word |= 1 << 22,
    }
    if instr.write_back {
        word |= 1 << 21;
    }
    if instr.op == StranOp::Ldr {
        word |= 1 << 20;
    }
    word |= instr.base.field("FPA transfer base")? << 16;
    word |= instr.dest.field("FPA transfer register")? << 12;
    word |= 1 << 8;
    word |= u32::from(instr.offset);
    Ok(word)
}

/// Encode `FLT` (integer to float).
pub fn fpa_flt_word(instr: &FpaFltInstr) -> Result<u32, Error> {
    let mut word = instr.cond.bits() | (0xe << 24);
    word |= fpa_data_size_bits(instr.size);
    word |= instr.dest.field("FLT destination")? << 16;
    word |= instr.src.field("FLT source")? << 12;
    word |= 1 << 8;
    word |= fpa_rounding_bits(instr.rounding);
    word |= 1 << 4;
    Ok(word)
}

/// Encode `FIX` (float to integer).
pub fn fpa_fix_word(instr: &FpaFixInstr) -> Result<u32, Error> {
    let mut word = instr.cond.bits() | (0xe << 24) | (1 << 20);
    word |= instr.dest.field("FIX destination")? << 12;
    word |= 1 << 8;
    word |= fpa_rounding_bits(instr.rounding);
    word |= 1 << 4;
    word |= fpa_op2_bits(&instr.op2)?;
    Ok(word)
}

/// Encode an FPA compare.
pub fn fpa_cmp_word(instr: &FpaCmpInstr) -> Result<u32, Error> {
    let mut word = instr.cond.bits() | (0xe << 24);
    word |= (instr.op as u32) << 21;
    word |= 1 << 20;
    word |= instr.op1.field("FPA compare op1")? << 16;
    word |= 0xf << 12;
    word |= 1 << 8;
    word |= 1 << 4;
    word |= fpa_op2_bits(&instr.op2)?;
    Ok(word)
}

/// Encode `WFS`/`RFS`.
pub fn fpa_cptran_word(instr: &FpaCptranInstr) -> Result<u32, Error> {
    let mut word = instr.cond.bits() | (0xe << 24);
    word |= match instr.op {
        FpaCptranOp::Wfs => 2 << 20,
        FpaCptranOp::Rfs => 3 << 20,
    };
    word |= instr.dest.field("FPA status register transfer")? << 12;
    word |= (1 << 8) | (1 << 4);
    Ok(word)
}

// --- VFP -----------------------------------------------------------------

/// A single-precision register in the low operand position (bits 3..0
/// plus the odd bit at 5).
fn vfp_s_lo(reg: VReg) -> u32 {
    ((reg.raw() >> 1) & 0xf) | ((reg.raw() & 1) << 5)
}

/// A single-precision register in the first-operand position (bits
/// 19..16 plus the odd bit at 7).
fn vfp_s_op1(reg: VReg) -> u32 {
    (((reg.raw() >> 1) & 0xf) << 16) | ((reg.raw() & 1) << 7)
}

/// A single-precision register in the destination position (bits
/// 15..12 plus the odd bit at 22).
fn vfp_s_dest(reg: VReg) -> u32 {
    (((reg.raw() >> 1) & 0xf) << 12) | ((reg.raw() & 1) << 22)
}

/// Encode a VFP load/store.
pub fn vfp_stran_word(instr: &VfpStranInstr) -> Result<u32, Error> {
    let mut copro = 0xbu32;
    let mut dest = instr.dest.raw() & 0x1f;
    let mut word = instr.cond.bits();
    word |= (0xc | u32::from(instr.pre_indexed)) << 24;
    if !instr.subtract {
        word |= 1 << 23;
    }
    if matches!(instr.op, VfpStranOp::Fsts | VfpStranOp::Flds) {
        word |= (dest & 1) << 22;
        dest >>= 1;
        copro -= 1;
    }
    if instr.write_back {
        word |= 1 << 21;
    }
    if matches!(instr.op, VfpStranOp::Flds | VfpStranOp::Fldd) {
        word |= 1 << 20;
    }
    word |= instr.base.field("VFP transfer base")? << 16;
    word |= dest << 12;
    word |= copro << 8;
    word |= u32::from(instr.offset);
    Ok(word)
}

/// Encode a VFP copy/negate/abs.
pub fn vfp_copy_word(instr: &VfpCopyInstr) -> Result<u32, Error> {
    let single = instr.precision == VfpPrecision::S;
    let mut word = match (instr.op, instr.precision) {
        (VfpCopyOp::Cpy, VfpPrecision::S) => 0x0eb0_0a40,
        (VfpCopyOp::Cpy, VfpPrecision::D) => 0x0eb0_0b40,
        (VfpCopyOp::Neg, VfpPrecision::S) => 0x0eb1_0a40,
        (VfpCopyOp::Neg, VfpPrecision::D) => 0x0eb1_0b40,
        (VfpCopyOp::Abs, VfpPrecision::S) => 0x0eb0_0ac0,
        (VfpCopyOp::Abs, VfpPrecision::D) => 0x0eb0_0bc0,
    };
    word |= instr.cond.bits();
    if single {
        word |= vfp_s_lo(instr.src);
        word |= vfp_s_dest(instr.dest);
    } else {
        word |= instr.src.raw() & 0xf;
        word |= (instr.dest.raw() & 0xf) << 12;
    }
    Ok(word)
}

/// Encode a VFP int/float conversion.
pub fn vfp_tran_word(instr: &VfpTranInstr) -> Result<u32, Error> {
    use VfpTranOp::*;

    let mut src = instr.src;
    let mut dest = instr.dest;
    // (base word, source is single, destination is single)
    let (base, s_src, s_dest) = match instr.op {
        Ftosis => (0x0ebd_0a40, true, true),
        Ftouis => (0x0ebc_0a40, true, true),
        Ftouizs => (0x0ebc_0ac0, true, true),
        Ftosizs => (0x0ebd_0ac0, true, true),
        Fsitos => (0x0eb8_0ac0, true, true),
        Fuitos => (0x0eb8_0a40, true, true),
        Fsitod => (0x0eb8_0bc0, true, false),
        Fuitod => (0x0eb8_0b40, true, false),
        Ftosid => (0x0ebd_0b40, false, true),
        Ftouid => (0x0ebc_0b40, false, true),
        Ftosizd => (0x0ebd_0bc0, false, true),
        Ftouizd => (0x0ebc_0bc0, false, true),
    };
    // With D-numbered registers the integer-carrying single operand
    // arrives as a double index and maps to its even S register.
    if instr.use_dregs {
        if !s_dest {
            src = VReg(src.raw() as u8 * 2);
        } else if !s_src {
            dest = VReg(dest.raw() as u8 * 2);
        }
    }

    let mut word = base | instr.cond.bits();
    word |= if s_src { vfp_s_lo(src) } else { src.raw() & 0xf };
    word |= if s_dest {
        vfp_s_dest(dest)
    } else {
        (dest.raw() & 0xf) << 12
    };
    Ok(word)
}

/// Encode a two-register VFP transfer.
pub fn vfp_tran_dbl_word(instr: &VfpTranDblInstr) -> Result<u32, Error> {
    let mut word = match instr.op {
        VfpTranDblOp::Fmdrr => {
            let mut word = 0x0c40_0b10;
            word |= instr.dest1.raw() & 0xf;
            word |= (instr.src1.raw() & 0xf) << 12;
            word |= (instr.src2.raw() & 0xf) << 16;
            word
        }
        VfpTranDblOp::Fmrrd => {
            let mut word = 0x0c50_0b10;
            word |= instr.src1.raw() & 0xf;
            word |= (instr.dest1.raw() & 0xf) << 12;
            word |= (instr.dest2.raw() & 0xf) << 16;
            word
        }
        VfpTranDblOp::Fmsrr => {
            if instr.dest1.raw() + 1 != instr.dest2.raw() {
                return Err(Error::Assertion("FMSRR needs a consecutive pair"));
            }
            let mut word = 0x0c40_0a10;
            word |= (instr.dest1.raw() >> 1) & 0xf;
            word |= (instr.dest1.raw() & 1) << 5;
            word |= (instr.src1.raw() & 0xf) << 12;
            word |= (instr.src2.raw() & 0xf) << 16;
            word
        }
        VfpTranDblOp::Fmrrs => {
            if instr.src1.raw() + 1 != instr.src2.raw() {
                return Err(Error::Assertion("FMRRS needs a consecutive pair"));
            }
            let mut word = 0x0c50_0a10;
            word |= (instr.src1.raw() >> 1) & 0xf;
            word |= (instr.src1.raw() & 1) << 5;
            word |= (instr.dest1.raw() & 0xf) << 12;
            word |= (instr.dest2.raw() & 0xf) << 16;
            word
        }
    };
    word |= instr.cond.bits();
    Ok(word)
}

/// Encode `FMSR`/`FMRS`.
pub fn vfp_cptran_word(instr: &VfpCptranInstr) -> Result<u32, Error> {
    let mut word;
    match instr.op {
        VfpCptranOp::Fmsr => {
            let mut dest = instr.dest.raw();
            if instr.use_dregs {
                dest *= 2;
            }
            word = 0x0e00_0a10;
            word |= (instr.src.raw() & 0xf) << 12;
            word |= ((dest >> 1) & 0xf) << 16;
            word |= (dest & 1) << 7;
        }
        VfpCptranOp::Fmrs => {
            let mut src = instr.src.raw();
            if instr.use_dregs {
                src *= 2;
            }
            word = 0x0e10_0a10;
            word |= (instr.dest.raw() & 0xf) << 12;
            word |= ((src >> 1) & 0xf) << 16;
            word |= (src & 1) << 7;
        }
    }
    Ok(word | instr.cond.bits())
}

/// Encode a three-operand VFP arithmetic instruction.
pub fn vfp_data_word(instr: &VfpDataInstr) -> Result<u32, Error> {
    let base: u32 = match instr.op {
        VfpDataOp::Mac => 0x0e00_0000,
        VfpDataOp::Nmac => 0x0e00_0040,
        VfpDataOp::Msc => 0x0e10_0000,
        VfpDataOp::Nmsc => 0x0e10_0040,
        VfpDataOp::Mul => 0x0e20_0000,
        VfpDataOp::Nmul => 0x0e20_0040,
        VfpDataOp::Add => 0x0e30_0000,
        VfpDataOp::Sub => 0x0e30_0040,
        VfpDataOp::Div => 0x0e80_0000,
    };
    let mut word = base | instr.cond.bits();
    match instr.precision {
        VfpPrecision::S => {
            word |= 0xa << 8;
            word |= vfp_s_op1(instr.op1);
            word |= vfp_s_lo(instr.op2);
            word |= vfp_s_dest(instr.dest);
        }
        VfpPrecision::D => {
            word |= 0xb << 8;
            word |= (instr.op1.raw() & 0xf) << 16;
            word |= instr.op2.raw() & 0xf;
            word |= (instr.dest.raw() & 0xf) << 12;
        }
    }
    Ok(word)
}

/// Encode a VFP compare.
pub fn vfp_cmp_word(instr: &VfpCmpInstr) -> Result<u32, Error> {
    let single = instr.precision == VfpPrecision::S;
    let (base, two_ops): (u32, bool) = match instr.op {
        VfpCmpOp::Cmp => (0x0eb4_0a40, true),
        VfpCmpOp::Cmpe => (0x0eb4_0ac0, true),
        VfpCmpOp::Cmpz => (0x0eb5_0a40, false),
        VfpCmpOp::Cmpez => (0x0eb5_0ac0, false),
    };
    let mut word = base | instr.cond.bits();
    if !single {
        word ^= 0x0100; // coprocessor 11
    }
    if single {
        if two_ops {
            word |= vfp_s_lo(instr.op2);
        }
        word |= vfp_s_dest(instr.op1);
    } else {
        if two_ops {
            word |= instr.op2.raw() & 0xf;
        }
        word |= (instr.op1.raw() & 0xf) << 12;
    }
    Ok(word)
}

/// Encode a VFP square root.
pub fn vfp_sqrt_word(instr: &VfpSqrtInstr) -> Result<u32, Error> {
    let mut word;
    if instr.precision == VfpPrecision::D {
        word = 0x0eb1_0bc0;
        word |= instr.op1.raw() & 0xf;
        word |= (instr.dest.raw() & 0xf) << 12;
    } else {
        word = 0x0eb1_0ac0;
        word |= vfp_s_lo(instr.op1);
        word |= vfp_s_dest(instr.dest);
    }
    Ok(word | instr.cond.bits())
}

/// Encode `FMRX`/`FMXR`.
pub fn vfp_sysreg_word(instr: &VfpSysregInstr) -> Result<u32, Error> {
    let mut word = match instr.op {
        VfpSysregOp::Fmrx => 0x0ef0_0a10,
        VfpSysregOp::Fmxr => 0x0ee0_0a10,
    };
    word |= instr.arm_reg.field("VFP system register transfer")? << 12;
    match instr.sysreg {
        VfpSysreg::Fpsid => (),
        VfpSysreg::Fpscr => word |= 1 << 16,
        VfpSysreg::Fpexc => word |= 8 << 16,
    }
    Ok(word | instr.cond.bits())
}

/// Encode a precision conversion.
pub fn vfp_cvt_word(instr: &VfpCvtInstr) -> Result<u32, Error> {
    let mut word;
    match instr.op {
        VfpCvtOp::Fcvtds => {
            word = 0x0eb7_0ac0;
            word |= (instr.dest.raw() & 0xf) << 12;
            word |= vfp_s_lo(instr.op1);
        }
        VfpCvtOp::Fcvtsd => {
            word = 0x0eb7_0bc0;
            word |= instr.op1.raw() & 0xf;
            word |= vfp_s_dest(instr.dest);
        }
    }
    Ok(word | instr.cond.bits())
}

// --- ARMv6 extensions ----------------------------------------------------

pub(crate) const SIMD_BASE_WORDS: [u32; 36] = [
    0x0620_0010, // QADD16
    0x0620_0090, // QADD8
    0x0620_0030, // QADDSUBX
    0x0620_0070, // QSUB16
    0x0620_00f0, // QSUB8
    0x0620_0050, // QSUBADDX
    0x0610_0010, // SADD16
    0x0610_0090, // SADD8
    0x0610_0030, // SADDSUBX
    0x0610_0070, // SSUB16
    0x0610_00f0, // SSUB8
    0x0610_0050, // SSUBADDX
    0x0630_0010, // SHADD16
    0x0630_0090, // SHADD8
    0x0630_0030, // SHADDSUBX
    0x0630_0070, // SHSUB16
    0x0630_00f0, // SHSUB8
    0x0630_0050, // SHSUBADDX
    0x0650_0010, // UADD16
    0x0650_0090, // UADD8
    0x0650_0030, // UADDSUBX
    0x0650_0070, // USUB16
    0x0650_00f0, // USUB8
    0x0650_0050, // USUBADDX
    0x0670_0010, // UHADD16
    0x0670_0090, // UHADD8
    0x0670_0030, // UHADDSUBX
    0x0670_0070, // UHSUB16
    0x0670_00f0, // UHSUB8
    0x0670_0050, // UHSUBADDX
    0x0660_0010, // UQADD16
    0x0660_0090, // UQADD8
    0x0660_0030, // UQADDSUBX
    0x0660_0070, // UQSUB16
    0x0660_00f0, // UQSUB8
    0x0660_0050, // UQSUBADDX
];

/// Encode an ARMv6 SIMD dyadic instruction.
pub fn simd_word(instr: &SimdInstr) -> Result<u32, Error> {
    let mut word = SIMD_BASE_WORDS[instr.op as usize];
    word |= instr.cond.bits();
    word |= instr.dest.field("SIMD destination")? << 12;
    word |= instr.op1.field("SIMD op1")? << 16;
    word |= instr.op2.field("SIMD op2")?;
    Ok(word)
}

/// Encode a sign-extension instruction.
pub fn signx_word(instr: &SignxInstr) -> Result<u32, Error> {
    let mut word = match instr.op {
        SignxOp::Sxtb => 0x06af_0070,
        SignxOp::Sxtb16 => 0x068f_0070,
        SignxOp::Sxth => 0x06bf_0070,
    };
    let ror = match instr.rotate {
        SignxRotation::None => 0,
        SignxRotation::Ror8 => 1,
        SignxRotation::Ror16 => 2,
        SignxRotation::Ror24 => 3,
    };
    word |= ror << 10;
    word |= instr.cond.bits();
    word |= instr.dest.field("sign-extend destination")? << 12;
    word |= instr.op1.field("sign-extend source")?;
    Ok(word)
}

pub(crate) fn encode(instr: &Instr) -> Result<u32, Error> {
    match instr {
        Instr::Data(i) => data_word(i),
        Instr::Mul(i) => mul_word(i),
        Instr::Stran(i) => stran_word(i),
        Instr::StranMisc(i) => stran_misc_word(i),
        Instr::Mtran(i) => mtran_word(i),
        Instr::Br(i) => branch_word(i),
        Instr::Swi(i) => swi_word(i),
        Instr::Flags(i) => flags_word(i),
        Instr::FpaDyadic(i) => fpa_dyadic_word(i),
        Instr::FpaMonadic(i) => fpa_monadic_word(i),
        Instr::FpaStran(i) => fpa_stran_word(i),
        Instr::FpaFlt(i) => fpa_flt_word(i),
        Instr::FpaFix(i) => fpa_fix_word(i),
        Instr::FpaCmp(i) => fpa_cmp_word(i),
        Instr::FpaCptran(i) => fpa_cptran_word(i),
        Instr::VfpData(i) => vfp_data_word(i),
        Instr::VfpCmp(i) => vfp_cmp_word(i),
        Instr::VfpCopy(i) => vfp_copy_word(i),
        Instr::VfpSqrt(i) => vfp_sqrt_word(i),
        Instr::VfpTran(i) => vfp_tran_word(i),
        Instr::VfpTranDbl(i) => vfp_tran_dbl_word(i),
        Instr::VfpCptran(i) => vfp_cptran_word(i),
        Instr::VfpSysreg(i) => vfp_sysreg_word(i),
        Instr::VfpCvt(i) => vfp_cvt_word(i),
        Instr::VfpStran(i) => vfp_stran_word(i),
        Instr::Simd(i) => simd_word(i),
        Instr::Signx(i) => signx_word(i),
        Instr::Ldrc(_) => Err(Error::NeedsSection("LDR =constant")),
        Instr::Ldrp(_) => Err(Error::NeedsSection("LDR =program-constant")),
        Instr::FpaLdrc(_) => Err(Error::NeedsSection("LDF =constant")),
        Instr::VfpLdrc(_) => Err(Error::NeedsSection("FLDD =constant")),
        Instr::Adr(_) => Err(Error::NeedsSection("ADR")),
        Instr::Cmov(_) => Err(Error::NeedsSection("conditional move")),
    }
}
