//! ARM32 instruction model for the Basalt compiler backend.
//!
//! This crate defines the closed set of instruction records the code
//! generator emits, the bit-exact mapping from a record to a 32-bit
//! instruction word, and the inverse mapping used by the disassembler.
//! It knows nothing about sections, labels offsets or constant pools;
//! those live in `basalt-codegen`, which drives the word encoders while
//! it streams a section.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

mod cond;
mod disass;
mod dump;
mod encode;
mod error;
mod imm;
mod instr;
mod op2;
mod reg;

#[cfg(test)]
mod encoding_tests;

pub use cond::Cond;
pub use disass::{disass, FloatModel};
pub use dump::dump;
pub use encode::{
    branch_word, data_word, flags_word, fpa_cmp_word, fpa_cptran_word, fpa_dyadic_word,
    fpa_fix_word, fpa_flt_word, fpa_monadic_word, fpa_stran_word, mtran_word, mul_word,
    signx_word, simd_word, stran_misc_word, stran_word, swi_word, vfp_cmp_word,
    vfp_copy_word, vfp_cptran_word, vfp_cvt_word, vfp_data_word, vfp_sqrt_word,
    vfp_stran_word, vfp_sysreg_word, vfp_tran_dbl_word, vfp_tran_word,
};
pub use error::Error;
pub use imm::encode_arm_imm;
pub use instr::{
    AdrInstr, BrInstr, BranchTarget, CmovInstr, DataInstr, DataOp, FlagsInstr, FlagsOp,
    FlagsOperand, FpaCmpInstr, FpaCmpOp, FpaCptranInstr, FpaCptranOp, FpaDyadicInstr,
    FpaDyadicOp, FpaFixInstr, FpaFltInstr, FpaLdrcInstr, FpaMonadicInstr, FpaMonadicOp,
    FpaOp2, FpaRounding, FpaSize, FpaStranInstr, Instr, Label, LdrcInstr, LdrpInstr,
    MiscOffset, MiscWidth, MtranInstr, MtranMode, MtranOp, MulInstr, SignxInstr,
    SignxOp, SignxRotation, SimdInstr, SimdOp, StatusReg, StranInstr, StranMiscInstr,
    StranOp, SwiInstr, VfpCmpInstr, VfpCmpOp, VfpCopyInstr, VfpCopyOp, VfpCptranInstr,
    VfpCptranOp, VfpCvtInstr, VfpCvtOp, VfpDataInstr, VfpDataOp, VfpLdrcInstr,
    VfpPrecision, VfpSqrtInstr, VfpStranInstr, VfpStranOp, VfpSysreg, VfpSysregInstr,
    VfpSysregOp, VfpTranDblInstr, VfpTranDblOp, VfpTranInstr, VfpTranOp,
};
pub use op2::{Op2, Shift, ShiftCount, ShiftKind};
pub use reg::{FReg, Reg, RegList, VReg};

/// Size of an encoded ARM instruction in bytes.
pub const INSTR_LEN: usize = 4;

/// Encode an instruction record into its single 32-bit word.
///
/// Pseudo-instructions (constant loads, `ADR`, conditional moves) and
/// branches whose target is still a label have no context-free encoding
/// and are refused with [`Error::NeedsSection`]; the section encoder in
/// `basalt-codegen` lowers them itself.
pub fn encode(instr: &Instr) -> Result<u32, Error> {
    encode::encode(instr)
}
