//! Disassembly listings for debugging encoder output.

use core::fmt::Write as _;

use crate::instr::*;
use crate::{disass, FloatModel, Instr};

impl Instr {
    /// The base mnemonic, without condition or size suffixes.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instr::Data(i) => match i.op {
                DataOp::And => "AND",
                DataOp::Eor => "EOR",
                DataOp::Sub => "SUB",
                DataOp::Rsb => "RSB",
                DataOp::Add => "ADD",
                DataOp::Adc => "ADC",
                DataOp::Sbc => "SBC",
                DataOp::Rsc => "RSC",
                DataOp::Tst => "TST",
                DataOp::Teq => "TEQ",
                DataOp::Cmp => "CMP",
                DataOp::Cmn => "CMN",
                DataOp::Orr => "ORR",
                DataOp::Mov => "MOV",
                DataOp::Bic => "BIC",
                DataOp::Mvn => "MVN",
            },
            Instr::Mul(i) => {
                if i.acc.is_some() {
                    "MLA"
                } else {
                    "MUL"
                }
            }
            Instr::Stran(i) => match i.op {
                StranOp::Ldr => "LDR",
                StranOp::Str => "STR",
            },
            Instr::StranMisc(i) => match i.op {
                StranOp::Ldr => "LDR",
                StranOp::Str => "STR",
            },
            Instr::Mtran(i) => match i.op {
                MtranOp::Ldm => "LDM",
                MtranOp::Stm => "STM",
            },
            Instr::Br(i) => {
                if i.link {
                    "BL"
                } else {
                    "B"
                }
            }
            Instr::Swi(_) => "SWI",
            Instr::Flags(i) => match i.op {
                FlagsOp::Mrs => "MRS",
                FlagsOp::Msr => "MSR",
            },
            Instr::Ldrc(_) | Instr::Ldrp(_) => "LDR",
            Instr::Adr(_) => "ADR",
            Instr::Cmov(_) => "CMOV",
            Instr::FpaDyadic(i) => match i.op {
                FpaDyadicOp::Adf => "ADF",
                FpaDyadicOp::Muf => "MUF",
                FpaDyadicOp::Suf => "SUF",
                FpaDyadicOp::Rsf => "RSF",
                FpaDyadicOp::Dvf => "DVF",
                FpaDyadicOp::Rdf => "RDF",
                FpaDyadicOp::Pow => "POW",
                FpaDyadicOp::Rpw => "RPW",
                FpaDyadicOp::Rmf => "RMF",
                FpaDyadicOp::Fml => "FML",
                FpaDyadicOp::Fdv => "FDV",
                FpaDyadicOp::Frd => "FRD",
                FpaDyadicOp::Pol => "POL",
            },
            Instr::FpaMonadic(i) => match i.op {
                FpaMonadicOp::Mvf => "MVF",
                FpaMonadicOp::Mnf => "MNF",
                FpaMonadicOp::Abs => "ABS",
                FpaMonadicOp::Rnd => "RND",
                FpaMonadicOp::Sqt => "SQT",
                FpaMonadicOp::Log => "LOG",
                FpaMonadicOp::Lgn => "LGN",
                FpaMonadicOp::Exp => "EXP",
                FpaMonadicOp::Sin => "SIN",
                FpaMonadicOp::Cos => "COS",
                FpaMonadicOp::Tan => "TAN",
                FpaMonadicOp::Asn => "ASN",
                FpaMonadicOp::Acs => "ACS",
                FpaMonadicOp::Atn => "ATN",
                FpaMonadicOp::Urd => "URD",
                FpaMonadicOp::Nrm => "NRM",
            },
            Instr::FpaStran(i) => match i.op {
                StranOp::Ldr => "LDF",
                StranOp::Str => "STF",
            },
            Instr::FpaFlt(_) => "FLT",
            Instr::FpaFix(_) => "FIX",
            Instr::FpaCmp(i) => match i.op {
                FpaCmpOp::Cmf => "CMF",
                FpaCmpOp::Cnf => "CNF",
                FpaCmpOp::Cmfe => "CMFE",
                FpaCmpOp::Cnfe => "CNFE",
            },
            Instr::FpaLdrc(_) => "LDF",
            Instr::FpaCptran(i) => match i.op {
                FpaCptranOp::Wfs => "WFS",
                FpaCptranOp::Rfs => "RFS",
            },
            Instr::VfpData(i) => match (i.op, i.precision) {
                (VfpDataOp::Mac, VfpPrecision::S) => "FMACS",
                (VfpDataOp::Mac, VfpPrecision::D) => "FMACD",
                (VfpDataOp::Nmac, VfpPrecision::S) => "FNMACS",
                (VfpDataOp::Nmac, VfpPrecision::D) => "FNMACD",
                (VfpDataOp::Msc, VfpPrecision::S) => "FMSCS",
                (VfpDataOp::Msc, VfpPrecision::D) => "FMSCD",
                (VfpDataOp::Nmsc, VfpPrecision::S) => "FNMSCS",
                (VfpDataOp::Nmsc, VfpPrecision::D) => "FNMSCD",
                (VfpDataOp::Mul, VfpPrecision::S) => "FMULS",
                (VfpDataOp::Mul, VfpPrecision::D) => "FMULD",
                (VfpDataOp::Nmul, VfpPrecision::S) => "FNMULS",
                (VfpDataOp::Nmul, VfpPrecision::D) => "FNMULD",
                (VfpDataOp::Add, VfpPrecision::S) => "FADDS",
                (VfpDataOp::Add, VfpPrecision::D) => "FADDD",
                (VfpDataOp::Sub, VfpPrecision::S) => "FSUBS",
                (VfpDataOp::Sub, VfpPrecision::D) => "FSUBD",
                (VfpDataOp::Div, VfpPrecision::S) => "FDIVS",
                (VfpDataOp::Div, VfpPrecision::D) => "FDIVD",
            },
            Instr::VfpCmp(i) => match (i.op, i.precision) {
                (VfpCmpOp::Cmp, VfpPrecision::S) => "FCMPS",
                (VfpCmpOp::Cmp, VfpPrecision::D) => "FCMPD",
                (VfpCmpOp::Cmpe, VfpPrecision::S) => "FCMPES",
                (VfpCmpOp::Cmpe, VfpPrecision::D) => "FCMPED",
                (VfpCmpOp::Cmpz, VfpPrecision::S) => "FCMPZS",
                (VfpCmpOp::Cmpz, VfpPrecision::D) => "FCMPZD",
                (VfpCmpOp::Cmpez, VfpPrecision::S) => "FCMPEZS",
                (VfpCmpOp::Cmpez, VfpPrecision::D) => "FCMPEZD",
            },
            Instr::VfpCopy(i) => match (i.op, i.precision) {
                (VfpCopyOp::Cpy, VfpPrecision::S) => "FCPYS",
                (VfpCopyOp::Cpy, VfpPrecision::D) => "FCPYD",
                (VfpCopyOp::Neg, VfpPrecision::S) => "FNEGS",
                (VfpCopyOp::Neg, VfpPrecision::D) => "FNEGD",
                (VfpCopyOp::Abs, VfpPrecision::S) => "FABSS",
                (VfpCopyOp::Abs, VfpPrecision::D) => "FABSD",
            },
            Instr::VfpSqrt(i) => match i.precision {
                VfpPrecision::S => "FSQRTS",
                VfpPrecision::D => "FSQRTD",
            },
            Instr::VfpTran(i) => match i.op {
                VfpTranOp::Fsitos => "FSITOS",
                VfpTranOp::Fuitos => "FUITOS",
                VfpTranOp::Ftosis => "FTOSIS",
                VfpTranOp::Ftosizs => "FTOSIZS",
                VfpTranOp::Ftouis => "FTOUIS",
                VfpTranOp::Ftouizs => "FTOUIZS",
                VfpTranOp::Fsitod => "FSITOD",
                VfpTranOp::Fuitod => "FUITOD",
                VfpTranOp::Ftosid => "FTOSID",
                VfpTranOp::Ftosizd => "FTOSIZD",
                VfpTranOp::Ftouid => "FTOUID",
                VfpTranOp::Ftouizd => "FTOUIZD",
            },
            Instr::VfpTranDbl(i) => match i.op {
                VfpTranDblOp::Fmdrr => "FMDRR",
                VfpTranDblOp::Fmrrd => "FMRRD",
                VfpTranDblOp::Fmsrr => "FMSRR",
                VfpTranDblOp::Fmrrs => "FMRRS",
            },
            Instr::VfpCptran(i) => match i.op {
                VfpCptranOp::Fmsr => "FMSR",
                VfpCptranOp::Fmrs => "FMRS",
            },
            Instr::VfpSysreg(i) => match i.op {
                VfpSysregOp::Fmrx => "FMRX",
                VfpSysregOp::Fmxr => "FMXR",
            },
            Instr::VfpCvt(i) => match i.op {
                VfpCvtOp::Fcvtds => "FCVTDS",
                VfpCvtOp::Fcvtsd => "FCVTSD",
            },
            Instr::VfpStran(i) => match i.op {
                VfpStranOp::Fsts => "FSTS",
                VfpStranOp::Flds => "FLDS",
                VfpStranOp::Fstd => "FSTD",
                VfpStranOp::Fldd => "FLDD",
            },
            Instr::VfpLdrc(_) => "FLDD",
            Instr::Simd(i) => match i.op {
                SimdOp::Qadd16 => "QADD16",
                SimdOp::Qadd8 => "QADD8",
                SimdOp::Qaddsubx => "QADDSUBX",
                SimdOp::Qsub16 => "QSUB16",
                SimdOp::Qsub8 => "QSUB8",
                SimdOp::Qsubaddx => "QSUBADDX",
                SimdOp::Sadd16 => "SADD16",
                SimdOp::Sadd8 => "SADD8",
                SimdOp::Saddsubx => "SADDSUBX",
                SimdOp::Ssub16 => "SSUB16",
                SimdOp::Ssub8 => "SSUB8",
                SimdOp::Ssubaddx => "SSUBADDX",
                SimdOp::Shadd16 => "SHADD16",
                SimdOp::Shadd8 => "SHADD8",
                SimdOp::Shaddsubx => "SHADDSUBX",
                SimdOp::Shsub16 => "SHSUB16",
                SimdOp::Shsub8 => "SHSUB8",
                SimdOp::Shsubaddx => "SHSUBADDX",
                SimdOp::Uadd16 => "UADD16",
                SimdOp::Uadd8 => "UADD8",
                SimdOp::Uaddsubx => "UADDSUBX",
                SimdOp::Usub16 => "USUB16",
                SimdOp::Usub8 => "USUB8",
                SimdOp::Usubaddx => "USUBADDX",
                SimdOp::Uhadd16 => "UHADD16",
                SimdOp::Uhadd8 => "UHADD8",
                SimdOp::Uhaddsubx => "UHADDSUBX",
                SimdOp::Uhsub16 => "UHSUB16",
                SimdOp::Uhsub8 => "UHSUB8",
                SimdOp::Uhsubaddx => "UHSUBADDX",
                SimdOp::Uqadd16 => "UQADD16",
                SimdOp::Uqadd8 => "UQADD8",
                SimdOp::Uqaddsubx => "UQADDSUBX",
                SimdOp::Uqsub16 => "UQSUB16",
                SimdOp::Uqsub8 => "UQSUB8",
                SimdOp::Uqsubaddx => "UQSUBADDX",
            },
            Instr::Signx(i) => match i.op {
                SignxOp::Sxtb => "SXTB",
                SignxOp::Sxtb16 => "SXTB16",
                SignxOp::Sxth => "SXTH",
            },
        }
    }
}

/// Render a code buffer as a listing, one word per line.
///
/// Words that do not decode under `float_model` appear as `DCW`
/// directives; trailing unaligned bytes as `DCB`. `base` is the load
/// address of the first byte.
pub fn dump(code: &[u8], float_model: FloatModel, base: u32) -> String {
    let mut out = String::new();
    let words = code.len() / 4;
    for i in 0..words {
        let word = u32::from_le_bytes(code[i * 4..i * 4 + 4].try_into().unwrap());
        let addr = base + (i as u32) * 4;
        match disass(word, float_model) {
            Ok(instr) => {
                let _ = writeln!(
                    out,
                    "{addr:08x}\t{word:08x}\t{}{}",
                    instr.mnemonic(),
                    instr.cond().suffix()
                );
            }
            Err(_) => {
                let _ = writeln!(out, "{addr:08x}\t{word:08x}\tDCW &{word:X}");
            }
        }
    }
    for (i, byte) in code[words * 4..].iter().enumerate() {
        let addr = base + (words * 4 + i) as u32;
        let _ = writeln!(out, "{addr:08x}\t      {byte:02x}\tDCB &{byte:X}");
    }
    out
}
