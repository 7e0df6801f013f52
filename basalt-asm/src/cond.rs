use core::fmt;

/// ARM condition code, bits 31..28 of every instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Cond {
    /// Equal (Z set).
    Eq = 0x0,
    /// Not equal (Z clear).
    Ne = 0x1,
    /// Carry set / unsigned higher or same.
    Cs = 0x2,
    /// Carry clear / unsigned lower.
    Cc = 0x3,
    /// Negative (N set).
    Mi = 0x4,
    /// Positive or zero (N clear).
    Pl = 0x5,
    /// Overflow.
    Vs = 0x6,
    /// No overflow.
    Vc = 0x7,
    /// Unsigned higher.
    Hi = 0x8,
    /// Unsigned lower or same.
    Ls = 0x9,
    /// Signed greater or equal.
    Ge = 0xa,
    /// Signed less than.
    Lt = 0xb,
    /// Signed greater than.
    Gt = 0xc,
    /// Signed less or equal.
    Le = 0xd,
    /// Always.
    Al = 0xe,
    /// Never. Reserved on ARMv5 but still a representable code.
    Nv = 0xf,
}

impl Cond {
    /// The condition field shifted into bits 31..28.
    pub(crate) const fn bits(self) -> u32 {
        (self as u32) << 28
    }

    /// Extract the condition code from an encoded word.
    pub const fn from_word(word: u32) -> Cond {
        match word >> 28 {
            0x0 => Cond::Eq,
            0x1 => Cond::Ne,
            0x2 => Cond::Cs,
            0x3 => Cond::Cc,
            0x4 => Cond::Mi,
            0x5 => Cond::Pl,
            0x6 => Cond::Vs,
            0x7 => Cond::Vc,
            0x8 => Cond::Hi,
            0x9 => Cond::Ls,
            0xa => Cond::Ge,
            0xb => Cond::Lt,
            0xc => Cond::Gt,
            0xd => Cond::Le,
            0xe => Cond::Al,
            _ => Cond::Nv,
        }
    }

    /// The suffix used in assembly listings; empty for `AL`.
    pub const fn suffix(self) -> &'static str {
        match self {
            Cond::Eq => "EQ",
            Cond::Ne => "NE",
            Cond::Cs => "CS",
            Cond::Cc => "CC",
            Cond::Mi => "MI",
            Cond::Pl => "PL",
            Cond::Vs => "VS",
            Cond::Vc => "VC",
            Cond::Hi => "HI",
            Cond::Ls => "LS",
            Cond::Ge => "GE",
            Cond::Lt => "LT",
            Cond::Gt => "GT",
            Cond::Le => "LE",
            Cond::Al => "",
            Cond::Nv => "NV",
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}
