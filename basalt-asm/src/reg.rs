use core::fmt;

use crate::Error;

/// An ARM integer register, `r0`..`r15`.
///
/// The value is not range-checked on construction; the word encoders
/// reject anything above 15 so that a bad register is caught at the
/// point it would corrupt an encoding, as the original backend did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reg(pub u8);

impl Reg {
    /// Stack pointer.
    pub const SP: Reg = Reg(13);
    /// Link register.
    pub const LR: Reg = Reg(14);
    /// Program counter.
    pub const PC: Reg = Reg(15);

    pub(crate) fn field(self, what: &'static str) -> Result<u32, Error> {
        if self.0 > 15 {
            return Err(Error::OutOfRange(what));
        }
        Ok(u32::from(self.0))
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// An FPA floating point register, `f0`..`f7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FReg(pub u8);

impl FReg {
    pub(crate) fn field(self, what: &'static str) -> Result<u32, Error> {
        if self.0 > 7 {
            return Err(Error::OutOfRange(what));
        }
        Ok(u32::from(self.0))
    }
}

impl fmt::Display for FReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// A VFP register number.
///
/// For single-precision operands this is `s0`..`s31` and the low bit
/// lands in the word's odd-register position; for double precision it
/// is `d0`..`d15`. Which interpretation applies is a property of the
/// instruction, not the register, mirroring the untyped register
/// numbers the rest of the backend traffics in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VReg(pub u8);

impl VReg {
    pub(crate) const fn raw(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for VReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}

bitflags::bitflags! {
    /// The register set operand of `LDM`/`STM`, bits 15..0.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct RegList: u16 {
        /// r0
        const R0 = 1 << 0;
        /// r1
        const R1 = 1 << 1;
        /// r2
        const R2 = 1 << 2;
        /// r3
        const R3 = 1 << 3;
        /// r4
        const R4 = 1 << 4;
        /// r5
        const R5 = 1 << 5;
        /// r6
        const R6 = 1 << 6;
        /// r7
        const R7 = 1 << 7;
        /// r8
        const R8 = 1 << 8;
        /// r9
        const R9 = 1 << 9;
        /// r10
        const R10 = 1 << 10;
        /// r11
        const R11 = 1 << 11;
        /// r12
        const R12 = 1 << 12;
        /// r13, the stack pointer
        const SP = 1 << 13;
        /// r14, the link register
        const LR = 1 << 14;
        /// r15, the program counter
        const PC = 1 << 15;
    }
}

impl RegList {
    /// The list containing exactly `reg`.
    pub fn of(reg: Reg) -> RegList {
        RegList::from_bits_truncate(1 << reg.0)
    }
}
