//! A small ARM model, just enough to execute the code the inline
//! generators produce. It fetches from memory, decodes through the
//! real disassembler and interprets the record, so these tests
//! exercise the whole encode/decode path as a side effect.

use basalt_asm::{
    disass, BranchTarget, Cond, DataOp, FloatModel, Instr, MtranMode, MtranOp, Op2,
    Reg, Shift, ShiftCount, ShiftKind, StranOp,
};

/// Return-address sentinel; `MOV pc, lr` lands here and stops the
/// run.
pub const STOP: u32 = 0x00f0_0000;

pub struct Machine {
    pub regs: [u32; 16],
    n: bool,
    z: bool,
    c: bool,
    v: bool,
    pub mem: Vec<u8>,
    code_base: u32,
    code_len: usize,
}

impl Machine {
    pub fn new(mem_size: usize) -> Machine {
        Machine {
            regs: [0; 16],
            n: false,
            z: false,
            c: false,
            v: false,
            mem: vec![0; mem_size],
            code_base: 0,
            code_len: 0,
        }
    }

    pub fn load(&mut self, code: &[u8], base: u32) {
        self.mem[base as usize..base as usize + code.len()].copy_from_slice(code);
        self.code_base = base;
        self.code_len = code.len();
    }

    pub fn word(&self, addr: u32) -> u32 {
        let addr = addr as usize;
        u32::from_le_bytes(self.mem[addr..addr + 4].try_into().unwrap())
    }

    pub fn set_word(&mut self, addr: u32, value: u32) {
        let addr = addr as usize;
        self.mem[addr..addr + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Reading the PC as an operand yields the fetch address plus 8.
    fn reg(&self, reg: Reg, pc: u32) -> u32 {
        if reg.0 == 15 {
            pc.wrapping_add(8)
        } else {
            self.regs[reg.0 as usize]
        }
    }

    fn cond_passes(&self, cond: Cond) -> bool {
        match cond {
            Cond::Eq => self.z,
            Cond::Ne => !self.z,
            Cond::Cs => self.c,
            Cond::Cc => !self.c,
            Cond::Mi => self.n,
            Cond::Pl => !self.n,
            Cond::Vs => self.v,
            Cond::Vc => !self.v,
            Cond::Hi => self.c && !self.z,
            Cond::Ls => !self.c || self.z,
            Cond::Ge => self.n == self.v,
            Cond::Lt => self.n != self.v,
            Cond::Gt => !self.z && self.n == self.v,
            Cond::Le => self.z || self.n != self.v,
            Cond::Al => true,
            Cond::Nv => false,
        }
    }

    fn shifted(&self, shift: &Shift, pc: u32) -> u32 {
        let value = self.reg(shift.reg, pc);
        let amount = match shift.count {
            ShiftCount::Imm(n) => u32::from(n),
            ShiftCount::Reg(r) => self.reg(r, pc) & 0xff,
        };
        match shift.kind {
            ShiftKind::Lsl => {
                if amount >= 32 {
                    0
                } else {
                    value << amount
                }
            }
            ShiftKind::Lsr => {
                if amount >= 32 {
                    0
                } else {
                    value >> amount
                }
            }
            ShiftKind::Asr => {
                if amount >= 32 {
                    ((value as i32) >> 31) as u32
                } else {
                    ((value as i32) >> amount) as u32
                }
            }
            ShiftKind::Ror => value.rotate_right(amount % 32),
            ShiftKind::Rrx => panic!("RRX in model"),
        }
    }

    /// A data-processing Op2: the immediate form is the rotated
    /// 8-bit field.
    fn data_op2(&self, op2: &Op2, pc: u32) -> u32 {
        match op2 {
            Op2::Imm(field) => (field & 0xff).rotate_right((field >> 8) * 2),
            Op2::Reg(r) => self.reg(*r, pc),
            Op2::Shifted(shift) => self.shifted(shift, pc),
        }
    }

    /// A transfer offset: the immediate form is a plain byte offset.
    fn stran_offset(&self, op2: &Op2, pc: u32) -> u32 {
        match op2 {
            Op2::Imm(field) => *field,
            Op2::Reg(r) => self.reg(*r, pc),
            Op2::Shifted(shift) => self.shifted(shift, pc),
        }
    }

    fn add_flags(&mut self, a: u32, b: u32, result: u32) {
        self.n = result & 0x8000_0000 != 0;
        self.z = result == 0;
        self.c = (a as u64 + b as u64) > u32::MAX as u64;
        self.v = ((a ^ result) & (b ^ result)) & 0x8000_0000 != 0;
    }

    fn sub_flags(&mut self, a: u32, b: u32, result: u32) {
        self.n = result & 0x8000_0000 != 0;
        self.z = result == 0;
        self.c = a >= b;
        self.v = ((a ^ b) & (a ^ result)) & 0x8000_0000 != 0;
    }

    fn logic_flags(&mut self, result: u32) {
        self.n = result & 0x8000_0000 != 0;
        self.z = result == 0;
    }

    pub fn run(&mut self, entry: u32, max_steps: usize) {
        self.regs[15] = entry;
        for _ in 0..max_steps {
            let pc = self.regs[15];
            if pc == STOP
                || pc < self.code_base
                || pc >= self.code_base + self.code_len as u32
            {
                return;
            }
            self.step(pc);
        }
        panic!("model did not halt after {max_steps} steps");
    }

    fn step(&mut self, pc: u32) {
        let word = self.word(pc);
        let instr = disass(word, FloatModel::Fpa)
            .unwrap_or_else(|e| panic!("bad word at {pc:#x}: {e}"));
        self.regs[15] = pc + 4;
        if !self.cond_passes(instr.cond()) {
            return;
        }

        match instr {
            Instr::Data(i) => {
                let a = self.reg(i.op1, pc);
                let b = self.data_op2(&i.op2, pc);
                let result = match i.op {
                    DataOp::And | DataOp::Tst => a & b,
                    DataOp::Eor | DataOp::Teq => a ^ b,
                    DataOp::Sub | DataOp::Cmp => a.wrapping_sub(b),
                    DataOp::Rsb => b.wrapping_sub(a),
                    DataOp::Add | DataOp::Cmn => a.wrapping_add(b),
                    DataOp::Adc => a.wrapping_add(b).wrapping_add(self.c as u32),
                    DataOp::Sbc => a.wrapping_sub(b).wrapping_sub(!self.c as u32),
                    DataOp::Rsc => b.wrapping_sub(a).wrapping_sub(!self.c as u32),
                    DataOp::Orr => a | b,
                    DataOp::Mov => b,
                    DataOp::Bic => a & !b,
                    DataOp::Mvn => !b,
                };
                if i.status {
                    match i.op {
                        DataOp::Add | DataOp::Cmn | DataOp::Adc => {
                            self.add_flags(a, b, result)
                        }
                        DataOp::Sub | DataOp::Cmp | DataOp::Sbc => {
                            self.sub_flags(a, b, result)
                        }
                        DataOp::Rsb | DataOp::Rsc => self.sub_flags(b, a, result),
                        _ => self.logic_flags(result),
                    }
                }
                let compare_only = matches!(
                    i.op,
                    DataOp::Tst | DataOp::Teq | DataOp::Cmp | DataOp::Cmn
                );
                if !compare_only {
                    self.regs[i.dest.0 as usize] = result;
                }
            }
            Instr::Stran(i) => {
                let base = self.reg(i.base, pc);
                let offset = self.stran_offset(&i.offset, pc);
                let indexed = if i.subtract {
                    base.wrapping_sub(offset)
                } else {
                    base.wrapping_add(offset)
                };
                let addr = if i.pre_indexed { indexed } else { base };
                match i.op {
                    StranOp::Ldr => {
                        let value = if i.byte {
                            u32::from(self.mem[addr as usize])
                        } else {
                            self.word(addr)
                        };
                        self.regs[i.dest.0 as usize] = value;
                    }
                    StranOp::Str => {
                        let value = self.regs[i.dest.0 as usize];
                        if i.byte {
                            self.mem[addr as usize] = value as u8;
                        } else {
                            self.set_word(addr, value);
                        }
                    }
                }
                if i.write_back || !i.pre_indexed {
                    self.regs[i.base.0 as usize] = indexed;
                }
            }
            Instr::Mtran(i) => {
                let base = self.reg(i.op0, pc);
                let count = i.regs.bits().count_ones();
                let (mut addr, final_base) = match i.mode {
                    MtranMode::Ia => (base, base.wrapping_add(count * 4)),
                    MtranMode::Ib => (base.wrapping_add(4), base.wrapping_add(count * 4)),
                    MtranMode::Da => (
                        base.wrapping_sub(count * 4).wrapping_add(4),
                        base.wrapping_sub(count * 4),
                    ),
                    MtranMode::Db => (
                        base.wrapping_sub(count * 4),
                        base.wrapping_sub(count * 4),
                    ),
                    _ => panic!("unconverted stack alias in model"),
                };
                for reg in 0..16u16 {
                    if i.regs.bits() & (1 << reg) == 0 {
                        continue;
                    }
                    match i.op {
                        MtranOp::Ldm => {
                            self.regs[reg as usize] = self.word(addr);
                        }
                        MtranOp::Stm => {
                            self.set_word(addr, self.regs[reg as usize]);
                        }
                    }
                    addr = addr.wrapping_add(4);
                }
                if i.write_back {
                    self.regs[i.op0.0 as usize] = final_base;
                }
            }
            Instr::Br(i) => {
                if i.link {
                    self.regs[14] = pc + 4;
                }
                match i.target {
                    BranchTarget::Offset(off) => {
                        self.regs[15] =
                            pc.wrapping_add(8).wrapping_add((off as u32) << 2);
                    }
                    _ => panic!("unresolved branch in model"),
                }
            }
            other => panic!("instruction not modelled: {other:?}"),
        }
    }
}
