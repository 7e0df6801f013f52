//! The register-use probe.
//!
//! At a call site the lowering needs to know which virtual argument
//! registers carry values into the call. A register counts as used
//! when some instruction between the section start and the call
//! writes it; the walk aborts at the first such write.

use crate::rv32::section::{IType, OpRef, RType, RvOpcode, RvSection, SbType, UjType};
use crate::rv32::walker::{walk_from_to, RvVisitor, WalkAborted, WalkResult};

/// Number of architectural integer registers; virtual registers are
/// numbered from here up.
pub const MAX_INT_REGS: u32 = 32;

/// A growable set of register numbers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegSet {
    bits: Vec<u64>,
}

impl RegSet {
    /// The empty set.
    pub fn new() -> RegSet {
        RegSet::default()
    }

    /// Add `reg` to the set.
    pub fn set(&mut self, reg: u32) {
        let word = (reg / 64) as usize;
        if word >= self.bits.len() {
            self.bits.resize(word + 1, 0);
        }
        self.bits[word] |= 1 << (reg % 64);
    }

    /// Whether `reg` is in the set.
    pub fn contains(&self, reg: u32) -> bool {
        self.bits
            .get((reg / 64) as usize)
            .map_or(false, |w| w & (1 << (reg % 64)) != 0)
    }

    /// The registers in the set, ascending.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.bits.iter().enumerate().flat_map(|(word, &bits)| {
            (0..64)
                .filter(move |bit| bits & (1 << bit) != 0)
                .map(move |bit| word as u32 * 64 + bit)
        })
    }
}

struct UseProbe {
    reg_num: u32,
    last_used: i32,
}

impl UseProbe {
    fn probe(&mut self, rd: u32) -> WalkResult {
        if rd == self.reg_num {
            self.last_used = -1;
            return Err(WalkAborted);
        }
        self.last_used += 1;
        Ok(())
    }
}

impl RvVisitor for UseProbe {
    fn r_instr(&mut self, _opcode: RvOpcode, operands: &RType) -> WalkResult {
        self.probe(operands.rd)
    }

    fn i_instr(&mut self, _opcode: RvOpcode, operands: &IType) -> WalkResult {
        self.probe(operands.rd)
    }

    fn sb_instr(&mut self, _opcode: RvOpcode, _operands: &SbType) -> WalkResult {
        // Branches and stores define nothing.
        self.last_used += 1;
        Ok(())
    }

    fn uj_instr(&mut self, _opcode: RvOpcode, operands: &UjType) -> WalkResult {
        self.probe(operands.rd)
    }
}

fn is_reg_used_before(
    section: &RvSection,
    reg_num: u32,
    from: OpRef,
    to: OpRef,
) -> bool {
    let mut probe = UseProbe {
        reg_num,
        last_used: 0,
    };
    let completed = walk_from_to(section, &mut probe, from, to);
    completed.is_err() && probe.last_used == -1
}

/// Collect the virtual argument registers written between `from` and
/// `to`. `int_args` is one past the highest argument register the
/// call passes.
pub fn regs_used_before(
    section: &RvSection,
    from: OpRef,
    to: OpRef,
    int_args: u32,
) -> RegSet {
    let mut used = RegSet::new();
    for reg in MAX_INT_REGS..int_args {
        if is_reg_used_before(section, reg, from, to) {
            used.set(reg);
        }
    }
    used
}
