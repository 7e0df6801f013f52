use basalt_asm::{
    encode_arm_imm, AdrInstr, BrInstr, BranchTarget, Cond, DataInstr, DataOp, FReg,
    FpaLdrcInstr, FpaSize, Instr, Label, LdrcInstr, LdrpInstr, MtranInstr, MtranMode,
    MtranOp, Op2, Reg, RegList, StranInstr, StranOp, SwiInstr, VReg, VfpLdrcInstr,
};

use crate::Error;

/// One element of a section's op stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ArmOp {
    /// An instruction record.
    Instr(Instr),
    /// A label definition; its offset is recorded when encoded.
    Label(Label),
    /// Zero-pad to a power-of-two boundary.
    Align(u32),
    /// A literal byte.
    Byte(u8),
    /// A literal halfword.
    TwoByte(u16),
    /// A literal word.
    FourByte(u32),
    /// A literal double in memory order.
    Double(f64),
    /// A literal double with its words reversed, as the FPA stores
    /// them.
    DoubleR(f64),
    /// A literal single-precision float.
    Float(f32),
    /// A zero-terminated string.
    String(String),
}

/// An entry in a section's integer constant pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntConstant {
    /// The pool label the loads refer to.
    pub label: Label,
    /// The literal, or the program-constant index for link-time
    /// entries.
    pub value: u32,
    /// The value is a program-constant index the linker resolves.
    pub link_time: bool,
}

/// An entry in a section's real constant pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealConstant {
    /// The pool label the loads refer to.
    pub label: Label,
    /// The literal.
    pub value: f64,
}

/// An independently encoded unit of target code.
///
/// A section owns its op stream, a label counter, and the integer and
/// real constant pools its PC-relative loads draw from. The builder
/// methods mirror the shapes the generators and the tiling pass emit
/// most often.
#[derive(Debug, Default)]
pub struct ArmSection {
    ops: Vec<ArmOp>,
    label_counter: usize,
    int_consts: Vec<IntConstant>,
    real_consts: Vec<RealConstant>,
}

impl ArmSection {
    /// An empty section.
    pub fn new() -> ArmSection {
        ArmSection::default()
    }

    /// Mint a fresh section-local label.
    pub fn fresh_label(&mut self) -> Label {
        let label = self.label_counter;
        self.label_counter += 1;
        label
    }

    /// Number of labels minted so far.
    pub fn label_count(&self) -> usize {
        self.label_counter
    }

    /// The op stream.
    pub fn ops(&self) -> &[ArmOp] {
        &self.ops
    }

    /// The integer constant pool.
    pub fn int_constants(&self) -> &[IntConstant] {
        &self.int_consts
    }

    /// The real constant pool.
    pub fn real_constants(&self) -> &[RealConstant] {
        &self.real_consts
    }

    pub(crate) fn int_constant(&self, label: Label) -> Option<&IntConstant> {
        self.int_consts.iter().find(|c| c.label == label)
    }

    pub(crate) fn real_constant(&self, label: Label) -> Option<&RealConstant> {
        self.real_consts.iter().find(|c| c.label == label)
    }

    /// Append a raw op.
    pub fn add_op(&mut self, op: ArmOp) {
        self.ops.push(op);
    }

    /// Append an instruction record.
    pub fn add_instr(&mut self, instr: Instr) {
        self.ops.push(ArmOp::Instr(instr));
    }

    /// Define `label` at the current position in the stream.
    pub fn add_label(&mut self, label: Label) {
        self.ops.push(ArmOp::Label(label));
    }

    /// `MOV`/`MVN` an immediate into `dest`, falling back to a pool
    /// load when no rotation of the value or its complement fits.
    pub fn add_mov_imm(
        &mut self,
        cond: Cond,
        status: bool,
        dest: Reg,
        imm: u32,
    ) -> Result<(), Error> {
        let (op, field) = if let Some(field) = encode_arm_imm(imm) {
            (DataOp::Mov, field)
        } else if let Some(field) = encode_arm_imm(!imm) {
            (DataOp::Mvn, field)
        } else {
            self.add_ldrc(cond, dest, imm);
            return Ok(());
        };
        self.add_instr(Instr::Data(DataInstr {
            op,
            cond,
            status,
            dest,
            op1: Reg(0),
            op2: Op2::Imm(field),
        }));
        Ok(())
    }

    /// Register-to-register move.
    pub fn add_mov_reg(&mut self, cond: Cond, status: bool, dest: Reg, src: Reg) {
        self.add_instr(Instr::Data(DataInstr {
            op: DataOp::Mov,
            cond,
            status,
            dest,
            op1: Reg(0),
            op2: Op2::Reg(src),
        }));
    }

    /// A data-processing op with an immediate operand.
    pub fn add_data_imm(
        &mut self,
        op: DataOp,
        cond: Cond,
        status: bool,
        dest: Reg,
        op1: Reg,
        imm: u32,
    ) -> Result<(), Error> {
        let field = encode_arm_imm(imm).ok_or(Error::BadImmediate(imm))?;
        self.add_instr(Instr::Data(DataInstr {
            op,
            cond,
            status,
            dest,
            op1,
            op2: Op2::Imm(field),
        }));
        Ok(())
    }

    /// `ADD dest, op1, #imm`.
    pub fn add_add_imm(
        &mut self,
        cond: Cond,
        status: bool,
        dest: Reg,
        op1: Reg,
        imm: u32,
    ) -> Result<(), Error> {
        self.add_data_imm(DataOp::Add, cond, status, dest, op1, imm)
    }

    /// `SUB dest, op1, #imm`.
    pub fn add_sub_imm(
        &mut self,
        cond: Cond,
        status: bool,
        dest: Reg,
        op1: Reg,
        imm: u32,
    ) -> Result<(), Error> {
        self.add_data_imm(DataOp::Sub, cond, status, dest, op1, imm)
    }

    /// A compare-class op (`CMP`/`CMN`/`TST`/`TEQ`) against an
    /// immediate.
    pub fn add_cmp_imm(
        &mut self,
        op: DataOp,
        cond: Cond,
        op1: Reg,
        imm: u32,
    ) -> Result<(), Error> {
        let field = encode_arm_imm(imm).ok_or(Error::BadImmediate(imm))?;
        self.add_instr(Instr::Data(DataInstr {
            op,
            cond,
            status: true,
            dest: Reg(0),
            op1,
            op2: Op2::Imm(field),
        }));
        Ok(())
    }

    /// A compare-class op against a register.
    pub fn add_cmp(&mut self, op: DataOp, cond: Cond, op1: Reg, op2: Reg) {
        self.add_instr(Instr::Data(DataInstr {
            op,
            cond,
            status: true,
            dest: Reg(0),
            op1,
            op2: Op2::Reg(op2),
        }));
    }

    /// A word or byte transfer with an immediate offset; a negative
    /// offset selects the subtract form.
    pub fn add_stran_imm(
        &mut self,
        op: StranOp,
        cond: Cond,
        dest: Reg,
        base: Reg,
        offset: i32,
        byte: bool,
    ) -> Result<(), Error> {
        let (subtract, magnitude) = if offset < 0 {
            (true, -offset as u32)
        } else {
            (false, offset as u32)
        };
        if magnitude > 4095 {
            return Err(Error::Assertion("transfer offset exceeds 12 bits"));
        }
        self.add_instr(Instr::Stran(StranInstr {
            op,
            cond,
            byte,
            pre_indexed: true,
            write_back: false,
            subtract,
            dest,
            base,
            offset: Op2::Imm(magnitude),
        }));
        Ok(())
    }

    /// A block transfer.
    pub fn add_mtran(
        &mut self,
        op: MtranOp,
        cond: Cond,
        op0: Reg,
        regs: RegList,
        mode: MtranMode,
        write_back: bool,
    ) {
        self.add_instr(Instr::Mtran(MtranInstr {
            op,
            cond,
            op0,
            regs,
            mode,
            write_back,
            status: false,
        }));
    }

    /// A branch to a section-local label.
    pub fn add_br(&mut self, cond: Cond, label: Label) {
        self.add_instr(Instr::Br(BrInstr {
            cond,
            link: false,
            target: BranchTarget::Label(label),
        }));
    }

    /// A call to another section.
    pub fn add_call(&mut self, cond: Cond, section: usize) {
        self.add_instr(Instr::Br(BrInstr {
            cond,
            link: true,
            target: BranchTarget::Section(section),
        }));
    }

    /// A software interrupt.
    pub fn add_swi(&mut self, cond: Cond, code: u32) {
        self.add_instr(Instr::Swi(SwiInstr { cond, code }));
    }

    /// `ADR dest, label`.
    pub fn add_adr(&mut self, cond: Cond, dest: Reg, label: Label) {
        self.add_instr(Instr::Adr(AdrInstr { cond, dest, label }));
    }

    /// Load a 32-bit literal through the section's integer pool.
    /// Identical non-link-time literals share one pool entry.
    pub fn add_ldrc(&mut self, cond: Cond, dest: Reg, value: u32) {
        let label = match self
            .int_consts
            .iter()
            .find(|c| !c.link_time && c.value == value)
        {
            Some(existing) => existing.label,
            None => {
                let label = self.fresh_label();
                self.int_consts.push(IntConstant {
                    label,
                    value,
                    link_time: false,
                });
                label
            }
        };
        self.add_instr(Instr::Ldrc(LdrcInstr {
            cond,
            dest,
            label,
            link_time: false,
        }));
    }

    /// Load the address of a program constant: a link-time pool word
    /// followed by `ADD dest, pc, dest`. The pair stays contiguous
    /// across pool flushes.
    pub fn add_const_addr(&mut self, cond: Cond, dest: Reg, pool_index: usize) {
        let label = self.fresh_label();
        self.add_instr(Instr::Ldrp(LdrpInstr {
            cond,
            dest,
            constant_label: label,
            pool_index,
        }));
        self.add_instr(Instr::Data(DataInstr {
            op: DataOp::Add,
            cond,
            status: false,
            dest,
            op1: Reg::PC,
            op2: Op2::Reg(dest),
        }));
    }

    /// Load a double literal into an FPA register through the
    /// section's real pool.
    pub fn add_fpa_ldrc(&mut self, cond: Cond, size: FpaSize, dest: FReg, value: f64) {
        let label = self.add_real_constant(value);
        self.add_instr(Instr::FpaLdrc(FpaLdrcInstr {
            cond,
            size,
            dest,
            label,
        }));
    }

    /// Load a double literal into a VFP register through the
    /// section's real pool.
    pub fn add_vfp_ldrc(&mut self, cond: Cond, dest: VReg, value: f64) {
        let label = self.add_real_constant(value);
        self.add_instr(Instr::VfpLdrc(VfpLdrcInstr { cond, dest, label }));
    }

    fn add_real_constant(&mut self, value: f64) -> Label {
        match self
            .real_consts
            .iter()
            .find(|c| c.value.to_bits() == value.to_bits())
        {
            Some(existing) => existing.label,
            None => {
                let label = self.fresh_label();
                self.real_consts.push(RealConstant { label, value });
                label
            }
        }
    }
}
