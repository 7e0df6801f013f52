use crate::Reg;

/// Barrel shifter operation applied to a register operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShiftKind {
    /// Logical shift left.
    Lsl,
    /// Logical shift right.
    Lsr,
    /// Arithmetic shift right.
    Asr,
    /// Rotate right.
    Ror,
    /// Rotate right with extend. Exists in the model for completeness
    /// but the code generator never materialises it; the word encoders
    /// treat it as an internal error.
    Rrx,
}

/// Shift amount: a constant or the low byte of a register.
///
/// The ISA encodes a constant amount of 32 as 0 for `LSR`/`ASR`; the
/// model always carries the logical value and the conversion happens at
/// the encoding boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShiftCount {
    /// Constant shift amount, 1..=32.
    Imm(u8),
    /// Shift amount taken from a register.
    Reg(Reg),
}

/// A shifted-register operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shift {
    /// The register being shifted.
    pub reg: Reg,
    /// The shift operation.
    pub kind: ShiftKind,
    /// The shift amount.
    pub count: ShiftCount,
}

/// The flexible second operand of data-processing and single-transfer
/// instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Op2 {
    /// The raw 12-bit immediate field. For data-processing this is the
    /// already-rotated 8-bit/4-bit pair produced by
    /// [`encode_arm_imm`](crate::encode_arm_imm); for load/store it is
    /// a plain 12-bit byte offset.
    Imm(u32),
    /// A bare register.
    Reg(Reg),
    /// A register run through the barrel shifter.
    Shifted(Shift),
}

impl Op2 {
    /// Immediate zero, the most common offset.
    pub const ZERO: Op2 = Op2::Imm(0);
}

impl From<Reg> for Op2 {
    fn from(reg: Reg) -> Op2 {
        Op2::Reg(reg)
    }
}
