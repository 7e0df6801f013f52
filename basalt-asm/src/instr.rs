//! The tagged instruction record.
//!
//! One variant per operand layout; where many opcode tags share a
//! layout (data-processing, the FPA arithmetic groups, the VFP groups,
//! SIMD) the variant carries a nested op-kind enum so every encoder and
//! decoder site can match exhaustively. The set is closed: new targets
//! extend it by adding variants.

use crate::{Cond, FReg, Op2, Reg, RegList, VReg};

/// A section-local label. Labels are small integers minted from the
/// owning section's counter.
pub type Label = usize;

/// Data-processing opcode, bits 24..21.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DataOp {
    /// Bitwise and.
    And = 0x0,
    /// Bitwise exclusive or.
    Eor = 0x1,
    /// Subtract.
    Sub = 0x2,
    /// Reverse subtract.
    Rsb = 0x3,
    /// Add.
    Add = 0x4,
    /// Add with carry.
    Adc = 0x5,
    /// Subtract with carry.
    Sbc = 0x6,
    /// Reverse subtract with carry.
    Rsc = 0x7,
    /// Test bits (AND, flags only).
    Tst = 0x8,
    /// Test equivalence (EOR, flags only).
    Teq = 0x9,
    /// Compare (SUB, flags only).
    Cmp = 0xa,
    /// Compare negated (ADD, flags only).
    Cmn = 0xb,
    /// Bitwise or.
    Orr = 0xc,
    /// Move.
    Mov = 0xd,
    /// Bit clear.
    Bic = 0xe,
    /// Move complement.
    Mvn = 0xf,
}

impl DataOp {
    pub(crate) const fn from_bits(bits: u32) -> DataOp {
        match bits & 0xf {
            0x0 => DataOp::And,
            0x1 => DataOp::Eor,
            0x2 => DataOp::Sub,
            0x3 => DataOp::Rsb,
            0x4 => DataOp::Add,
            0x5 => DataOp::Adc,
            0x6 => DataOp::Sbc,
            0x7 => DataOp::Rsc,
            0x8 => DataOp::Tst,
            0x9 => DataOp::Teq,
            0xa => DataOp::Cmp,
            0xb => DataOp::Cmn,
            0xc => DataOp::Orr,
            0xd => DataOp::Mov,
            0xe => DataOp::Bic,
            _ => DataOp::Mvn,
        }
    }
}

/// Data-processing instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataInstr {
    /// Operation tag.
    pub op: DataOp,
    /// Condition code.
    pub cond: Cond,
    /// Update the status flags (the `S` bit).
    pub status: bool,
    /// Destination register. Ignored by the compare class.
    pub dest: Reg,
    /// First operand register. Ignored by `MOV`/`MVN`.
    pub op1: Reg,
    /// Second operand.
    pub op2: Op2,
}

/// `MUL` / `MLA`; `acc` present selects the accumulate form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MulInstr {
    /// Condition code.
    pub cond: Cond,
    /// Update the status flags.
    pub status: bool,
    /// Destination register.
    pub dest: Reg,
    /// Multiplicand.
    pub rm: Reg,
    /// Multiplier.
    pub rs: Reg,
    /// Accumulator operand; `Some` makes this an `MLA`.
    pub acc: Option<Reg>,
}

/// Load or store direction shared by the transfer classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StranOp {
    /// Load from memory.
    Ldr,
    /// Store to memory.
    Str,
}

/// Single word/byte transfer (`LDR`/`STR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StranInstr {
    /// Direction.
    pub op: StranOp,
    /// Condition code.
    pub cond: Cond,
    /// Transfer a single byte instead of a word.
    pub byte: bool,
    /// Apply the offset before the access.
    pub pre_indexed: bool,
    /// Write the computed address back to the base register.
    pub write_back: bool,
    /// Subtract the offset instead of adding it.
    pub subtract: bool,
    /// Register loaded or stored.
    pub dest: Reg,
    /// Base address register.
    pub base: Reg,
    /// Offset operand. An immediate here is a plain 12-bit byte offset.
    pub offset: Op2,
}

/// Width/signedness selector of the miscellaneous transfer class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MiscWidth {
    /// Unsigned halfword.
    H,
    /// Signed byte (load only).
    Sb,
    /// Signed halfword (load only).
    Sh,
    /// Doubleword pair.
    D,
}

/// Offset operand of the miscellaneous transfer class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MiscOffset {
    /// 8-bit immediate, split across the word as two nibbles.
    Imm(u8),
    /// Register offset.
    Reg(Reg),
}

/// Halfword / signed byte / doubleword transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StranMiscInstr {
    /// Direction.
    pub op: StranOp,
    /// Condition code.
    pub cond: Cond,
    /// Transfer width.
    pub width: MiscWidth,
    /// Apply the offset before the access.
    pub pre_indexed: bool,
    /// Write the computed address back to the base register.
    pub write_back: bool,
    /// Subtract the offset instead of adding it.
    pub subtract: bool,
    /// Register loaded or stored.
    pub dest: Reg,
    /// Base address register.
    pub base: Reg,
    /// Offset operand.
    pub offset: MiscOffset,
}

/// Multi-transfer direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MtranOp {
    /// `LDM`.
    Ldm,
    /// `STM`.
    Stm,
}

/// Multi-transfer addressing mode. `IA`/`IB`/`DA`/`DB` are the
/// architectural modes; the stack-oriented aliases `FA`/`FD`/`EA`/`ED`
/// are converted according to the transfer direction at encode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MtranMode {
    /// Increment after.
    Ia,
    /// Increment before.
    Ib,
    /// Decrement after.
    Da,
    /// Decrement before.
    Db,
    /// Full ascending stack.
    Fa,
    /// Full descending stack.
    Fd,
    /// Empty ascending stack.
    Ea,
    /// Empty descending stack.
    Ed,
}

/// Block transfer (`LDM`/`STM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MtranInstr {
    /// Direction.
    pub op: MtranOp,
    /// Condition code.
    pub cond: Cond,
    /// Base address register.
    pub op0: Reg,
    /// Registers transferred.
    pub regs: RegList,
    /// Addressing mode.
    pub mode: MtranMode,
    /// Write the final address back to the base register.
    pub write_back: bool,
    /// Set the `S` bit (user-bank transfer). The disassembler refuses
    /// words with this set; the encoder accepts it for completeness.
    pub status: bool,
}

/// Branch target forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BranchTarget {
    /// A section-local label, resolved by back-patching.
    Label(Label),
    /// The index of another section; the linker rewrites the offset
    /// field once every section's start address is known.
    Section(usize),
    /// The raw signed 24-bit word offset field, as the disassembler
    /// reports it.
    Offset(i32),
    /// Branch through a register (`MOV pc, reg`).
    Indirect(Reg),
}

/// Branch, optionally with link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrInstr {
    /// Condition code.
    pub cond: Cond,
    /// Set the link register (`BL`).
    pub link: bool,
    /// Where to go.
    pub target: BranchTarget,
}

/// Software interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwiInstr {
    /// Condition code.
    pub cond: Cond,
    /// 24-bit comment field, interpreted by the OS.
    pub code: u32,
}

/// Which status register `MRS`/`MSR` touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusReg {
    /// The current program status register.
    Cpsr,
    /// The saved program status register.
    Spsr,
}

/// Status register move direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlagsOp {
    /// Status register to general register.
    Mrs,
    /// General register or immediate to status register.
    Msr,
}

/// `MSR` source operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlagsOperand {
    /// Register source; for `MRS` this is the destination.
    Reg(Reg),
    /// Rotated immediate field (MSR only).
    Imm(u32),
}

/// Status register move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlagsInstr {
    /// Direction.
    pub op: FlagsOp,
    /// Condition code.
    pub cond: Cond,
    /// Which status register.
    pub flag_reg: StatusReg,
    /// `MSR` field mask, bits 19..16 of the word, stored unshifted.
    pub fields: u32,
    /// The register/immediate operand.
    pub operand: FlagsOperand,
}

/// Load-constant pseudo-instruction: `LDR dest, =value`.
///
/// The value lives in the owning section's integer pool under `label`;
/// the section encoder emits a PC-relative `LDR` and patches the offset
/// when the pool is flushed. `link_time` marks program-constant-pool
/// references whose value is an address only the linker knows; they are
/// followed by an `ADD dest, pc, dest` so the pair must stay together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LdrcInstr {
    /// Condition code.
    pub cond: Cond,
    /// Destination register.
    pub dest: Reg,
    /// Integer-pool label within the section.
    pub label: Label,
    /// The pool entry holds a program-constant index to resolve at
    /// link time.
    pub link_time: bool,
}

/// Load the address of a program constant: the `LDR`+`ADD` pair whose
/// pool word the linker fills with a PC-relative distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LdrpInstr {
    /// Condition code.
    pub cond: Cond,
    /// Destination register.
    pub dest: Reg,
    /// Fresh label for the pool word.
    pub constant_label: Label,
    /// Index into the program's global constant pool.
    pub pool_index: usize,
}

/// Address-of-label pseudo-instruction (`ADR`), lowered to
/// `ADD dest, pc, #imm` or `SUB` when the target precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdrInstr {
    /// Condition code.
    pub cond: Cond,
    /// Destination register.
    pub dest: Reg,
    /// Target label.
    pub label: Label,
}

/// Conditional move pseudo-instruction.
///
/// Unfused: `CMP op1, #0; MOVEQ dest, op3; MOVNE dest, op2`. Fused
/// forms reuse the flags of a preceding compare and carry their own
/// condition pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CmovInstr {
    /// Destination register.
    pub dest: Reg,
    /// Register tested against zero (unfused form).
    pub op1: Reg,
    /// Value when the condition holds.
    pub op2: Reg,
    /// Value when the condition does not hold.
    pub op3: Reg,
    /// The compare has already been emitted.
    pub fused: bool,
    /// Condition selecting `op2` in the fused form.
    pub true_cond: Cond,
    /// Condition selecting `op3` in the fused form.
    pub false_cond: Cond,
}

// --- FPA -----------------------------------------------------------------

/// FPA operand size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FpaSize {
    /// Single precision, 4 bytes.
    Single,
    /// Double precision, 8 bytes.
    Double,
    /// Extended precision, 12 bytes.
    Extended,
}

impl FpaSize {
    /// Size in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            FpaSize::Single => 4,
            FpaSize::Double => 8,
            FpaSize::Extended => 12,
        }
    }
}

/// FPA rounding mode, bits 6..5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FpaRounding {
    /// Round to nearest.
    Nearest,
    /// Round towards plus infinity.
    PlusInfinity,
    /// Round towards minus infinity.
    MinusInfinity,
    /// Round towards zero.
    Zero,
}

/// FPA second operand: register or one of the eight immediate
/// constants. The immediate is the raw 4-bit field (bit 3 marks the
/// immediate form).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FpaOp2 {
    /// Register operand.
    Reg(FReg),
    /// Immediate-constant field, 0x8..=0xf.
    Imm(u8),
}

/// Two-operand FPA arithmetic, opcode in bits 23..20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FpaDyadicOp {
    /// Add.
    Adf = 0,
    /// Multiply.
    Muf = 1,
    /// Subtract.
    Suf = 2,
    /// Reverse subtract.
    Rsf = 3,
    /// Divide.
    Dvf = 4,
    /// Reverse divide.
    Rdf = 5,
    /// Power.
    Pow = 6,
    /// Reverse power.
    Rpw = 7,
    /// Remainder.
    Rmf = 8,
    /// Fast multiply.
    Fml = 9,
    /// Fast divide.
    Fdv = 10,
    /// Fast reverse divide.
    Frd = 11,
    /// Polar angle.
    Pol = 12,
}

/// One-operand FPA arithmetic; same opcode space with bit 15 set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FpaMonadicOp {
    /// Move.
    Mvf = 0,
    /// Move negated.
    Mnf = 1,
    /// Absolute value.
    Abs = 2,
    /// Round to integral.
    Rnd = 3,
    /// Square root.
    Sqt = 4,
    /// Logarithm base 10.
    Log = 5,
    /// Natural logarithm.
    Lgn = 6,
    /// Exponential.
    Exp = 7,
    /// Sine.
    Sin = 8,
    /// Cosine.
    Cos = 9,
    /// Tangent.
    Tan = 10,
    /// Arc sine.
    Asn = 11,
    /// Arc cosine.
    Acs = 12,
    /// Arc tangent.
    Atn = 13,
    /// Unnormalised round.
    Urd = 14,
    /// Normalise.
    Nrm = 15,
}

/// Dyadic FPA data operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FpaDyadicInstr {
    /// Operation.
    pub op: FpaDyadicOp,
    /// Condition code.
    pub cond: Cond,
    /// Operand/result size.
    pub size: FpaSize,
    /// Rounding mode.
    pub rounding: FpaRounding,
    /// Destination register.
    pub dest: FReg,
    /// First operand.
    pub op1: FReg,
    /// Second operand.
    pub op2: FpaOp2,
}

/// Monadic FPA data operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FpaMonadicInstr {
    /// Operation.
    pub op: FpaMonadicOp,
    /// Condition code.
    pub cond: Cond,
    /// Operand/result size.
    pub size: FpaSize,
    /// Rounding mode.
    pub rounding: FpaRounding,
    /// Destination register.
    pub dest: FReg,
    /// Operand.
    pub op2: FpaOp2,
}

/// FPA load/store (`LDF`/`STF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FpaStranInstr {
    /// Direction.
    pub op: StranOp,
    /// Condition code.
    pub cond: Cond,
    /// Transfer size.
    pub size: FpaSize,
    /// FPA register loaded or stored.
    pub dest: FReg,
    /// Base address register.
    pub base: Reg,
    /// Unsigned word offset, 0..=255.
    pub offset: u8,
    /// Apply the offset before the access.
    pub pre_indexed: bool,
    /// Write the computed address back.
    pub write_back: bool,
    /// Subtract the offset.
    pub subtract: bool,
}

/// Integer to float (`FLT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FpaFltInstr {
    /// Condition code.
    pub cond: Cond,
    /// Rounding mode.
    pub rounding: FpaRounding,
    /// Result size.
    pub size: FpaSize,
    /// FPA destination.
    pub dest: FReg,
    /// Integer source register.
    pub src: Reg,
}

/// Float to integer (`FIX`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FpaFixInstr {
    /// Condition code.
    pub cond: Cond,
    /// Rounding mode.
    pub rounding: FpaRounding,
    /// Integer destination register.
    pub dest: Reg,
    /// FPA source operand.
    pub op2: FpaOp2,
}

/// FPA compare flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FpaCmpOp {
    /// Compare.
    Cmf = 4,
    /// Compare negated.
    Cnf = 5,
    /// Compare with exception.
    Cmfe = 6,
    /// Compare negated with exception.
    Cnfe = 7,
}

/// FPA compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FpaCmpInstr {
    /// Flavour.
    pub op: FpaCmpOp,
    /// Condition code.
    pub cond: Cond,
    /// First operand.
    pub op1: FReg,
    /// Second operand.
    pub op2: FpaOp2,
}

/// FPA load-real-constant pseudo-instruction; the double lives in the
/// section's real pool and is loaded PC-relative after the flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FpaLdrcInstr {
    /// Condition code.
    pub cond: Cond,
    /// Transfer size.
    pub size: FpaSize,
    /// Destination register.
    pub dest: FReg,
    /// Real-pool label within the section.
    pub label: Label,
}

/// FPA status transfer flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FpaCptranOp {
    /// Write FPSR from register.
    Wfs,
    /// Read FPSR into register.
    Rfs,
}

/// FPA status register transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FpaCptranInstr {
    /// Flavour.
    pub op: FpaCptranOp,
    /// Condition code.
    pub cond: Cond,
    /// ARM register read or written.
    pub dest: Reg,
}

// --- VFP -----------------------------------------------------------------

/// VFP operand precision; selects coprocessor 10 or 11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VfpPrecision {
    /// Single precision (`s` registers).
    S,
    /// Double precision (`d` registers).
    D,
}

/// VFP arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VfpDataOp {
    /// Multiply accumulate.
    Mac,
    /// Negated multiply accumulate.
    Nmac,
    /// Multiply subtract.
    Msc,
    /// Negated multiply subtract.
    Nmsc,
    /// Multiply.
    Mul,
    /// Negated multiply.
    Nmul,
    /// Add.
    Add,
    /// Subtract.
    Sub,
    /// Divide.
    Div,
}

/// Three-operand VFP arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VfpDataInstr {
    /// Operation.
    pub op: VfpDataOp,
    /// Precision.
    pub precision: VfpPrecision,
    /// Condition code.
    pub cond: Cond,
    /// Destination register.
    pub dest: VReg,
    /// First operand.
    pub op1: VReg,
    /// Second operand.
    pub op2: VReg,
}

/// VFP compare flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VfpCmpOp {
    /// Compare.
    Cmp,
    /// Compare, raising on NaN.
    Cmpe,
    /// Compare with zero.
    Cmpz,
    /// Compare with zero, raising on NaN.
    Cmpez,
}

/// VFP compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VfpCmpInstr {
    /// Flavour.
    pub op: VfpCmpOp,
    /// Precision.
    pub precision: VfpPrecision,
    /// Condition code.
    pub cond: Cond,
    /// First operand.
    pub op1: VReg,
    /// Second operand; ignored by the zero-compare forms.
    pub op2: VReg,
}

/// VFP register copy flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VfpCopyOp {
    /// Copy.
    Cpy,
    /// Negate.
    Neg,
    /// Absolute value.
    Abs,
}

/// VFP register copy/negate/abs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VfpCopyInstr {
    /// Flavour.
    pub op: VfpCopyOp,
    /// Precision.
    pub precision: VfpPrecision,
    /// Condition code.
    pub cond: Cond,
    /// Destination register.
    pub dest: VReg,
    /// Source register.
    pub src: VReg,
}

/// VFP square root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VfpSqrtInstr {
    /// Precision.
    pub precision: VfpPrecision,
    /// Condition code.
    pub cond: Cond,
    /// Destination register.
    pub dest: VReg,
    /// Operand.
    pub op1: VReg,
}

/// VFP int/float conversions. The `S`/`D` suffix names the float side;
/// the integer always travels in a single-precision register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum VfpTranOp {
    Fsitos,
    Fuitos,
    Ftosis,
    Ftosizs,
    Ftouis,
    Ftouizs,
    Fsitod,
    Fuitod,
    Ftosid,
    Ftosizd,
    Ftouid,
    Ftouizd,
}

/// VFP int/float conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VfpTranInstr {
    /// Operation.
    pub op: VfpTranOp,
    /// Double the register number of the double-precision operand
    /// (used when the register allocator numbers D registers by
    /// S-register pairs).
    pub use_dregs: bool,
    /// Condition code.
    pub cond: Cond,
    /// Destination register.
    pub dest: VReg,
    /// Source register.
    pub src: VReg,
}

/// Two-register VFP transfer flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VfpTranDblOp {
    /// Two ARM registers to one double.
    Fmdrr,
    /// One double to two ARM registers.
    Fmrrd,
    /// Two ARM registers to a consecutive single pair.
    Fmsrr,
    /// A consecutive single pair to two ARM registers.
    Fmrrs,
}

/// Two-register VFP transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VfpTranDblInstr {
    /// Flavour.
    pub op: VfpTranDblOp,
    /// Condition code.
    pub cond: Cond,
    /// First destination.
    pub dest1: VReg,
    /// Second destination; consecutive-pair forms require
    /// `dest2 == dest1 + 1`.
    pub dest2: VReg,
    /// First source.
    pub src1: VReg,
    /// Second source.
    pub src2: VReg,
}

/// Single-register ARM↔VFP transfer flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VfpCptranOp {
    /// ARM register to single.
    Fmsr,
    /// Single to ARM register.
    Fmrs,
}

/// Single-register ARM↔VFP transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VfpCptranInstr {
    /// Flavour.
    pub op: VfpCptranOp,
    /// Double the VFP register number first.
    pub use_dregs: bool,
    /// Condition code.
    pub cond: Cond,
    /// Destination register.
    pub dest: VReg,
    /// Source register.
    pub src: VReg,
}

/// VFP system register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VfpSysreg {
    /// Silicon ID register.
    Fpsid,
    /// Status and control register.
    Fpscr,
    /// Exception register.
    Fpexc,
}

/// VFP system register move flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VfpSysregOp {
    /// System register to ARM register.
    Fmrx,
    /// ARM register to system register.
    Fmxr,
}

/// VFP system register move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VfpSysregInstr {
    /// Flavour.
    pub op: VfpSysregOp,
    /// Condition code.
    pub cond: Cond,
    /// System register.
    pub sysreg: VfpSysreg,
    /// ARM register read or written.
    pub arm_reg: Reg,
}

/// Precision conversion flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VfpCvtOp {
    /// Single to double.
    Fcvtds,
    /// Double to single.
    Fcvtsd,
}

/// Precision conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VfpCvtInstr {
    /// Flavour.
    pub op: VfpCvtOp,
    /// Condition code.
    pub cond: Cond,
    /// Destination register.
    pub dest: VReg,
    /// Source register.
    pub op1: VReg,
}

/// VFP load/store flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VfpStranOp {
    /// Store single.
    Fsts,
    /// Load single.
    Flds,
    /// Store double.
    Fstd,
    /// Load double.
    Fldd,
}

/// VFP load/store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VfpStranInstr {
    /// Flavour.
    pub op: VfpStranOp,
    /// Condition code.
    pub cond: Cond,
    /// VFP register loaded or stored.
    pub dest: VReg,
    /// Base address register.
    pub base: Reg,
    /// Unsigned word offset, 0..=255.
    pub offset: u8,
    /// Apply the offset before the access.
    pub pre_indexed: bool,
    /// Write the computed address back.
    pub write_back: bool,
    /// Subtract the offset.
    pub subtract: bool,
}

/// VFP load-real-constant pseudo-instruction (`FLDD` from the real
/// pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VfpLdrcInstr {
    /// Condition code.
    pub cond: Cond,
    /// Destination register.
    pub dest: VReg,
    /// Real-pool label within the section.
    pub label: Label,
}

// --- ARMv6 extensions ----------------------------------------------------

/// ARMv6 parallel add/subtract operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
#[repr(u8)]
pub enum SimdOp {
    Qadd16,
    Qadd8,
    Qaddsubx,
    Qsub16,
    Qsub8,
    Qsubaddx,
    Sadd16,
    Sadd8,
    Saddsubx,
    Ssub16,
    Ssub8,
    Ssubaddx,
    Shadd16,
    Shadd8,
    Shaddsubx,
    Shsub16,
    Shsub8,
    Shsubaddx,
    Uadd16,
    Uadd8,
    Uaddsubx,
    Usub16,
    Usub8,
    Usubaddx,
    Uhadd16,
    Uhadd8,
    Uhaddsubx,
    Uhsub16,
    Uhsub8,
    Uhsubaddx,
    Uqadd16,
    Uqadd8,
    Uqaddsubx,
    Uqsub16,
    Uqsub8,
    Uqsubaddx,
}

/// ARMv6 SIMD dyadic instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimdInstr {
    /// Operation.
    pub op: SimdOp,
    /// Condition code.
    pub cond: Cond,
    /// Destination register.
    pub dest: Reg,
    /// First operand.
    pub op1: Reg,
    /// Second operand.
    pub op2: Reg,
}

/// Sign-extension flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignxOp {
    /// Sign extend byte.
    Sxtb,
    /// Sign extend two bytes to two halfwords.
    Sxtb16,
    /// Sign extend halfword.
    Sxth,
}

/// Pre-extension rotation, bits 11..10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignxRotation {
    /// No rotation.
    None,
    /// Rotate right by 8.
    Ror8,
    /// Rotate right by 16.
    Ror16,
    /// Rotate right by 24.
    Ror24,
}

/// ARMv6 sign-extension instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignxInstr {
    /// Flavour.
    pub op: SignxOp,
    /// Condition code.
    pub cond: Cond,
    /// Rotation applied to the source first.
    pub rotate: SignxRotation,
    /// Destination register.
    pub dest: Reg,
    /// Source register.
    pub op1: Reg,
}

/// An ARM instruction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Instr {
    Data(DataInstr),
    Mul(MulInstr),
    Stran(StranInstr),
    StranMisc(StranMiscInstr),
    Mtran(MtranInstr),
    Br(BrInstr),
    Swi(SwiInstr),
    Flags(FlagsInstr),
    Ldrc(LdrcInstr),
    Ldrp(LdrpInstr),
    Adr(AdrInstr),
    Cmov(CmovInstr),
    FpaDyadic(FpaDyadicInstr),
    FpaMonadic(FpaMonadicInstr),
    FpaStran(FpaStranInstr),
    FpaFlt(FpaFltInstr),
    FpaFix(FpaFixInstr),
    FpaCmp(FpaCmpInstr),
    FpaLdrc(FpaLdrcInstr),
    FpaCptran(FpaCptranInstr),
    VfpData(VfpDataInstr),
    VfpCmp(VfpCmpInstr),
    VfpCopy(VfpCopyInstr),
    VfpSqrt(VfpSqrtInstr),
    VfpTran(VfpTranInstr),
    VfpTranDbl(VfpTranDblInstr),
    VfpCptran(VfpCptranInstr),
    VfpSysreg(VfpSysregInstr),
    VfpCvt(VfpCvtInstr),
    VfpStran(VfpStranInstr),
    VfpLdrc(VfpLdrcInstr),
    Simd(SimdInstr),
    Signx(SignxInstr),
}

impl Instr {
    /// The instruction's condition code.
    pub fn cond(&self) -> Cond {
        match self {
            Instr::Data(i) => i.cond,
            Instr::Mul(i) => i.cond,
            Instr::Stran(i) => i.cond,
            Instr::StranMisc(i) => i.cond,
            Instr::Mtran(i) => i.cond,
            Instr::Br(i) => i.cond,
            Instr::Swi(i) => i.cond,
            Instr::Flags(i) => i.cond,
            Instr::Ldrc(i) => i.cond,
            Instr::Ldrp(i) => i.cond,
            Instr::Adr(i) => i.cond,
            Instr::Cmov(_) => Cond::Al,
            Instr::FpaDyadic(i) => i.cond,
            Instr::FpaMonadic(i) => i.cond,
            Instr::FpaStran(i) => i.cond,
            Instr::FpaFlt(i) => i.cond,
            Instr::FpaFix(i) => i.cond,
            Instr::FpaCmp(i) => i.cond,
            Instr::FpaLdrc(i) => i.cond,
            Instr::FpaCptran(i) => i.cond,
            Instr::VfpData(i) => i.cond,
            Instr::VfpCmp(i) => i.cond,
            Instr::VfpCopy(i) => i.cond,
            Instr::VfpSqrt(i) => i.cond,
            Instr::VfpTran(i) => i.cond,
            Instr::VfpTranDbl(i) => i.cond,
            Instr::VfpCptran(i) => i.cond,
            Instr::VfpSysreg(i) => i.cond,
            Instr::VfpCvt(i) => i.cond,
            Instr::VfpStran(i) => i.cond,
            Instr::VfpLdrc(i) => i.cond,
            Instr::Simd(i) => i.cond,
            Instr::Signx(i) => i.cond,
        }
    }
}
