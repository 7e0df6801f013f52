//! The streaming section encoder.
//!
//! Constants referenced by PC-relative loads are collected while the
//! section streams and materialised in inline pools. A pool is
//! flushed either at the end of the section or early, when the next
//! instruction could push a pending load beyond its reach; early
//! flushes are guarded by a branch over the pool. Branches to labels
//! and `ADR` address computations emit with a zero offset field and
//! are back-patched once the section's layout is final.
//!
//! Integer and floating point literals known at compile time land in
//! the inline pools. Program constants (blobs whose address only the
//! linker knows) get a placeholder pool word and a link-table entry;
//! see [`Linker`].

use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use basalt_asm::{
    branch_word, data_word, fpa_stran_word, stran_word, vfp_stran_word, BrInstr,
    BranchTarget, Cond, DataInstr, DataOp, FpaStranInstr, Instr, Label, Op2, Reg,
    StranInstr, StranOp, VfpStranInstr, VfpStranOp,
};
use tracing::{debug, trace};

use crate::arm32::{ArmOp, ArmProg, ArmSection, ConstantData, Linker};
use crate::Error;

/// Word `LDR`s reach ±4096 bytes around PC; the check keeps one word
/// spare for the branch that jumps the pool.
const INT_POOL_LIMIT: usize = 4092;
/// FPA/VFP double loads reach ±1024 bytes.
const REAL_POOL_LIMIT: usize = 1020;

/// Encoder configuration.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Address the image will be loaded at. The emitted code is
    /// position-dependent but internally PC-relative, so this only
    /// matters to platform wrappers and listings.
    pub base_addr: u32,
    /// Expected section count, used to presize the link tables when
    /// the caller encodes programs incrementally.
    pub sections_hint: usize,
}

impl Default for EncodeOptions {
    fn default() -> EncodeOptions {
        EncodeOptions {
            base_addr: 0x8000,
            sections_hint: 0,
        }
    }
}

/// Platform wrapper applied to the linked image before write-out,
/// typically to prepend an OS-specific header.
pub type PlatFn<'a> = &'a dyn Fn(&mut Vec<u8>) -> Result<(), Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    /// Integer pool literal.
    Ldr,
    /// Program-constant address word.
    Ldrp,
    /// Real pool literal.
    Ldrf,
}

#[derive(Debug, Clone, Copy)]
struct PendingConst {
    label: Label,
    code_index: usize,
    pool_index: usize,
    kind: PendingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatchKind {
    Branch,
    Adr,
}

#[derive(Debug, Clone, Copy)]
struct BackPatch {
    kind: PatchKind,
    label: Label,
    code_index: usize,
}

struct Encoder {
    reverse_fpa_consts: bool,
    code: Vec<u8>,
    label_offsets: Vec<Option<usize>>,
    max_labels: usize,
    constants: Vec<PendingConst>,
    int_const_count: usize,
    real_const_count: usize,
    /// Offset of the oldest pending integer load since the last
    /// flush; the origin of the 4 KiB window.
    ldrc_int: Option<usize>,
    /// Likewise for the 1 KiB real-load window.
    ldrc_real: Option<usize>,
    back_patches: Vec<BackPatch>,
    link: Linker,
}

impl Encoder {
    fn new(prog: &ArmProg, opts: &EncodeOptions) -> Encoder {
        let mut words = 0;
        let mut labels = 0;
        for section in &prog.sections {
            words += section.ops().len() + section.int_constants().len();
            words += 2 * section.real_constants().len();
            labels = labels.max(section.label_count());
        }
        Encoder {
            reverse_fpa_consts: prog.float.reverse_doubles(),
            code: Vec::with_capacity(words * 4),
            label_offsets: vec![None; labels],
            max_labels: 0,
            constants: Vec::new(),
            int_const_count: 0,
            real_const_count: 0,
            ldrc_int: None,
            ldrc_real: None,
            back_patches: Vec::new(),
            link: Linker::new(prog.sections.len().max(opts.sections_hint)),
        }
    }

    fn push_word(&mut self, word: u32) -> Result<(), Error> {
        if self.code.len() & 3 != 0 {
            return Err(Error::BadAlignment(self.code.len()));
        }
        self.code.extend_from_slice(&word.to_le_bytes());
        Ok(())
    }

    fn read_word(&self, offset: usize) -> Result<u32, Error> {
        if offset & 3 != 0 {
            return Err(Error::BadAlignment(offset));
        }
        let bytes = self
            .code
            .get(offset..offset + 4)
            .ok_or(Error::Assertion("patch site outside the code buffer"))?;
        Ok(u32::from_le_bytes(bytes.try_into().expect("4 bytes")))
    }

    fn write_word(&mut self, offset: usize, word: u32) -> Result<(), Error> {
        if offset & 3 != 0 {
            return Err(Error::BadAlignment(offset));
        }
        let bytes = self
            .code
            .get_mut(offset..offset + 4)
            .ok_or(Error::Assertion("patch site outside the code buffer"))?;
        bytes.copy_from_slice(&word.to_le_bytes());
        Ok(())
    }

    fn or_word(&mut self, offset: usize, bits: u32) -> Result<(), Error> {
        let word = self.read_word(offset)?;
        self.write_word(offset, word | bits)
    }

    fn reset_pool_state(&mut self) {
        self.constants.clear();
        self.int_const_count = 0;
        self.real_const_count = 0;
        self.ldrc_int = None;
        self.ldrc_real = None;
    }

    /// Define a label from the op stream. Each may be set once.
    fn define_label(&mut self, label: Label) -> Result<(), Error> {
        if label >= self.max_labels {
            return Err(Error::Assertion("label was never minted"));
        }
        if self.label_offsets[label].is_some() {
            return Err(Error::Assertion("label defined twice"));
        }
        self.label_offsets[label] = Some(self.code.len());
        Ok(())
    }

    /// Pool labels are redefined by every flush that materialises
    /// them, so they bypass the single-definition check.
    fn place_pool_label(&mut self, label: Label) {
        if label >= self.label_offsets.len() {
            self.label_offsets.resize(label + 1, None);
        }
        self.label_offsets[label] = Some(self.code.len());
    }

    /// Flush the pending pools early if emitting `adj` more bytes
    /// could push a pending load out of range.
    fn check_pool_adj(&mut self, section: &ArmSection, adj: usize) -> Result<(), Error> {
        let pool_end = self.code.len()
            + self.int_const_count * 4
            + self.real_const_count * 8
            + adj;

        let mut pool_needed = self
            .ldrc_real
            .map_or(false, |origin| pool_end - origin >= REAL_POOL_LIMIT);
        if !pool_needed {
            pool_needed = self
                .ldrc_int
                .map_or(false, |origin| pool_end - origin >= INT_POOL_LIMIT);
        }
        if !pool_needed {
            return Ok(());
        }

        // Jump over the pool; the target label does not exist until
        // the constants have been written.
        let label = self.max_labels;
        self.back_patches.push(BackPatch {
            kind: PatchKind::Branch,
            label,
            code_index: self.code.len(),
        });
        let word = branch_word(&BrInstr {
            cond: Cond::Al,
            link: false,
            target: BranchTarget::Offset(0),
        })?;
        self.push_word(word)?;

        self.flush_constants(section)?;

        self.max_labels += 1;
        self.place_pool_label(label);
        Ok(())
    }

    fn check_pool(&mut self, section: &ArmSection) -> Result<(), Error> {
        self.check_pool_adj(section, 0)
    }

    /// Materialise every pending constant and patch the offset field
    /// of each load that refers to it.
    fn flush_constants(&mut self, section: &ArmSection) -> Result<(), Error> {
        if self.constants.is_empty() {
            self.reset_pool_state();
            return Ok(());
        }
        trace!(
            offset = self.code.len(),
            ints = self.int_const_count,
            reals = self.real_const_count,
            "flushing constant pool"
        );

        let pending = std::mem::take(&mut self.constants);
        for cnst in &pending {
            self.place_pool_label(cnst.label);
            match cnst.kind {
                PendingKind::Ldr => {
                    let entry = section
                        .int_constant(cnst.label)
                        .ok_or(Error::Assertion("pool load without a constant"))?;
                    if entry.link_time {
                        self.link.add_constant_ref(
                            cnst.code_index,
                            self.code.len(),
                            entry.value as usize,
                        );
                        self.push_word(0xffff_ffff)?;
                    } else {
                        self.push_word(entry.value)?;
                    }
                }
                PendingKind::Ldrp => {
                    self.link.add_constant_ref(
                        cnst.code_index,
                        self.code.len(),
                        cnst.pool_index,
                    );
                    self.push_word(0)?;
                }
                PendingKind::Ldrf => {
                    let entry = section
                        .real_constant(cnst.label)
                        .ok_or(Error::Assertion("pool load without a constant"))?;
                    let bits = entry.value.to_bits();
                    let lo = bits as u32;
                    let hi = (bits >> 32) as u32;
                    if self.reverse_fpa_consts {
                        self.push_word(hi)?;
                        self.push_word(lo)?;
                    } else {
                        self.push_word(lo)?;
                        self.push_word(hi)?;
                    }
                }
            }
        }

        for cnst in &pending {
            let target = self.label_offsets[cnst.label]
                .ok_or(Error::Assertion("pool label not placed"))?;
            let dist = target as i64 - cnst.code_index as i64 - 8;
            let mut magnitude = dist.unsigned_abs();
            match cnst.kind {
                PendingKind::Ldr | PendingKind::Ldrp => {
                    if magnitude > 4096 {
                        return Err(Error::Assertion("pool word out of LDR range"));
                    }
                }
                PendingKind::Ldrf => {
                    if magnitude > 1024 {
                        return Err(Error::Assertion("pool double out of LDF range"));
                    }
                    // The coprocessor offset field counts words.
                    magnitude /= 4;
                }
            }
            self.or_word(cnst.code_index, magnitude as u32)?;
        }

        self.reset_pool_state();
        Ok(())
    }

    fn add_pending(&mut self, kind: PendingKind, label: Label, pool_index: usize) {
        if kind == PendingKind::Ldrf {
            self.real_const_count += 1;
            if self.ldrc_real.is_none() {
                self.ldrc_real = Some(self.code.len());
            }
        } else {
            self.int_const_count += 1;
            if self.ldrc_int.is_none() {
                self.ldrc_int = Some(self.code.len());
            }
        }
        self.constants.push(PendingConst {
            label,
            code_index: self.code.len(),
            pool_index,
            kind,
        });
    }

    /// A PC-relative load with a zero offset; the flush fills the
    /// field in. The add direction is fixed because the pool always
    /// lands after the load.
    fn push_pool_ldr(&mut self, cond: Cond, dest: Reg) -> Result<(), Error> {
        let word = stran_word(&StranInstr {
            op: StranOp::Ldr,
            cond,
            byte: false,
            pre_indexed: true,
            write_back: false,
            subtract: false,
            dest,
            base: Reg::PC,
            offset: Op2::Imm(0),
        })?;
        self.push_word(word)
    }

    fn encode_instr(&mut self, section: &ArmSection, instr: &Instr) -> Result<(), Error> {
        match instr {
            Instr::Br(br) => self.encode_branch(section, br),
            Instr::Ldrc(i) => {
                // Keep room for the load and its constant, plus the
                // ADD of the address-of-constant pair.
                let adj = if i.link_time { 12 } else { 8 };
                self.check_pool_adj(section, adj)?;
                self.add_pending(PendingKind::Ldr, i.label, 0);
                self.push_pool_ldr(i.cond, i.dest)
            }
            Instr::Ldrp(i) => {
                self.check_pool_adj(section, 12)?;
                self.add_pending(PendingKind::Ldrp, i.constant_label, i.pool_index);
                self.push_pool_ldr(i.cond, i.dest)
            }
            Instr::FpaLdrc(i) => {
                // The double plus the load itself.
                self.check_pool_adj(section, 12)?;
                self.add_pending(PendingKind::Ldrf, i.label, 0);
                let word = fpa_stran_word(&FpaStranInstr {
                    op: StranOp::Ldr,
                    cond: i.cond,
                    size: i.size,
                    dest: i.dest,
                    base: Reg::PC,
                    offset: 0,
                    pre_indexed: true,
                    write_back: false,
                    subtract: false,
                })?;
                self.push_word(word)
            }
            Instr::VfpLdrc(i) => {
                self.check_pool_adj(section, 12)?;
                self.add_pending(PendingKind::Ldrf, i.label, 0);
                let word = vfp_stran_word(&VfpStranInstr {
                    op: VfpStranOp::Fldd,
                    cond: i.cond,
                    dest: i.dest,
                    base: Reg::PC,
                    offset: 0,
                    pre_indexed: true,
                    write_back: false,
                    subtract: false,
                })?;
                self.push_word(word)
            }
            Instr::Adr(i) => {
                self.check_pool(section)?;
                self.back_patches.push(BackPatch {
                    kind: PatchKind::Adr,
                    label: i.label,
                    code_index: self.code.len(),
                });
                let word = data_word(&DataInstr {
                    op: DataOp::Add,
                    cond: i.cond,
                    status: false,
                    dest: i.dest,
                    op1: Reg::PC,
                    op2: Op2::Imm(0),
                })?;
                self.push_word(word)
            }
            Instr::Cmov(i) => {
                if !i.fused {
                    self.check_pool(section)?;
                    let cmp = data_word(&DataInstr {
                        op: DataOp::Cmp,
                        cond: Cond::Al,
                        status: true,
                        dest: Reg(0),
                        op1: i.op1,
                        op2: Op2::Imm(0),
                    })?;
                    self.push_word(cmp)?;
                }
                self.check_pool(section)?;
                let mov_false = data_word(&DataInstr {
                    op: DataOp::Mov,
                    cond: if i.fused { i.true_cond } else { Cond::Eq },
                    status: false,
                    dest: i.dest,
                    op1: Reg(0),
                    op2: Op2::Reg(i.op3),
                })?;
                self.push_word(mov_false)?;
                self.check_pool(section)?;
                let mov_true = data_word(&DataInstr {
                    op: DataOp::Mov,
                    cond: if i.fused { i.false_cond } else { Cond::Ne },
                    status: false,
                    dest: i.dest,
                    op1: Reg(0),
                    op2: Op2::Reg(i.op2),
                })?;
                self.push_word(mov_true)
            }
            _ => {
                self.check_pool(section)?;
                let word = basalt_asm::encode(instr)?;
                self.push_word(word)
            }
        }
    }

    fn encode_branch(&mut self, section: &ArmSection, br: &BrInstr) -> Result<(), Error> {
        self.check_pool(section)?;
        match br.target {
            BranchTarget::Offset(_) | BranchTarget::Indirect(_) => {
                let word = branch_word(br)?;
                self.push_word(word)
            }
            BranchTarget::Label(label) => {
                self.back_patches.push(BackPatch {
                    kind: PatchKind::Branch,
                    label,
                    code_index: self.code.len(),
                });
                let word = branch_word(&BrInstr {
                    cond: br.cond,
                    link: br.link,
                    target: BranchTarget::Offset(0),
                })?;
                self.push_word(word)
            }
            BranchTarget::Section(index) => {
                if index > 0xff_ffff {
                    return Err(Error::Assertion("section index exceeds 24 bits"));
                }
                // The callee's index rides in the offset field until
                // link time.
                self.link.add_external(self.code.len());
                let word = branch_word(&BrInstr {
                    cond: br.cond,
                    link: br.link,
                    target: BranchTarget::Offset(0),
                })?;
                self.push_word(word | index as u32)
            }
        }
    }

    fn align(&mut self, boundary: usize) {
        let rem = self.code.len() & (boundary - 1);
        if rem != 0 {
            for _ in 0..boundary - rem {
                self.code.push(0);
            }
        }
    }

    fn encode_op(&mut self, section: &ArmSection, op: &ArmOp) -> Result<(), Error> {
        match op {
            ArmOp::Instr(instr) => self.encode_instr(section, instr)?,
            ArmOp::Label(label) => self.define_label(*label)?,
            ArmOp::Align(boundary) => {
                if !boundary.is_power_of_two() {
                    return Err(Error::Assertion("alignment is not a power of two"));
                }
                self.align(*boundary as usize);
            }
            ArmOp::Byte(b) => self.code.push(*b),
            ArmOp::TwoByte(h) => self.code.extend_from_slice(&h.to_le_bytes()),
            ArmOp::FourByte(w) => self.code.extend_from_slice(&w.to_le_bytes()),
            ArmOp::Double(d) => self.code.extend_from_slice(&d.to_bits().to_le_bytes()),
            ArmOp::DoubleR(d) => {
                let bits = d.to_bits();
                self.code
                    .extend_from_slice(&((bits >> 32) as u32).to_le_bytes());
                self.code.extend_from_slice(&(bits as u32).to_le_bytes());
            }
            ArmOp::Float(f) => self.code.extend_from_slice(&f.to_bits().to_le_bytes()),
            ArmOp::String(s) => {
                self.code.extend_from_slice(s.as_bytes());
                self.code.push(0);
            }
        }
        Ok(())
    }

    fn apply_back_patches(&mut self) -> Result<(), Error> {
        let patches = std::mem::take(&mut self.back_patches);
        for bp in &patches {
            let target = self.label_offsets[bp.label]
                .ok_or(Error::Assertion("branch to an undefined label"))?;
            match bp.kind {
                PatchKind::Branch => {
                    let dist = target as i64 - bp.code_index as i64;
                    if dist.unsigned_abs() > 1 << 23 {
                        return Err(Error::Assertion("branch target out of range"));
                    }
                    let field = ((dist / 4 - 2) as u32) & 0xff_ffff;
                    self.or_word(bp.code_index, field)?;
                }
                PatchKind::Adr => {
                    let mut dist = target as i64 - bp.code_index as i64 - 8;
                    let mut word = self.read_word(bp.code_index)?;
                    if dist < 0 {
                        // Switch the ADD for a SUB.
                        word &= !(1 << 23);
                        word |= 1 << 22;
                        dist = -dist;
                    }
                    let field = basalt_asm::encode_arm_imm(dist as u32)
                        .ok_or(Error::BadAdr { dist })?;
                    self.write_word(bp.code_index, word | field)?;
                }
            }
        }
        Ok(())
    }

    fn encode_section(&mut self, index: usize, section: &ArmSection) -> Result<(), Error> {
        debug!(section = index, offset = self.code.len(), "encoding section");
        self.link.set_section_start(index, self.code.len());

        self.max_labels = section.label_count();
        if self.label_offsets.len() < self.max_labels {
            self.label_offsets.resize(self.max_labels, None);
        }
        self.label_offsets.fill(None);
        self.back_patches.clear();
        self.reset_pool_state();

        for op in section.ops() {
            self.encode_op(section, op)?;
        }

        self.flush_constants(section)?;
        self.apply_back_patches()?;

        // Sections always end on a word boundary, whatever raw data
        // they trail off with.
        self.align(4);
        Ok(())
    }

    fn append_constant_blob(&mut self, data: &ConstantData) {
        if data.is_double && self.reverse_fpa_consts {
            for chunk in data.bytes.chunks(8) {
                if chunk.len() == 8 {
                    self.code.extend_from_slice(&chunk[4..8]);
                    self.code.extend_from_slice(&chunk[0..4]);
                } else {
                    self.code.extend_from_slice(chunk);
                }
            }
        } else {
            self.code.extend_from_slice(&data.bytes);
        }
        self.align(4);
    }
}

fn encode_prog(prog: &ArmProg, opts: &EncodeOptions) -> Result<Vec<u8>, Error> {
    let mut enc = Encoder::new(prog, opts);

    for (index, section) in prog.sections.iter().enumerate() {
        enc.encode_section(index, section)?;
    }

    let mut locations = Vec::with_capacity(prog.constant_pool.len());
    for data in &prog.constant_pool {
        locations.push(enc.code.len());
        enc.append_constant_blob(data);
    }

    enc.link.resolve(&mut enc.code, &locations)?;
    Ok(enc.code)
}

/// Encode and link a program into a flat byte image.
pub fn encode_to_vec(prog: &ArmProg, opts: &EncodeOptions) -> Result<Vec<u8>, Error> {
    encode_prog(prog, opts)
}

/// Encode and link a program, apply the optional platform wrapper,
/// and write the image to `path`.
pub fn encode_to_file(
    prog: &ArmProg,
    opts: &EncodeOptions,
    path: &Path,
    plat: Option<PlatFn<'_>>,
) -> Result<(), Error> {
    let mut image = encode_prog(prog, opts)?;
    if let Some(wrap) = plat {
        wrap(&mut image)?;
    }

    let mut file = File::create(path).map_err(|source| Error::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(&image)
        .map_err(|source| Error::FileWrite { source })?;
    file.flush().map_err(|source| Error::FileWrite { source })?;
    Ok(())
}
