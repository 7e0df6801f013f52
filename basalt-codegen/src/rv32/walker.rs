use crate::rv32::section::{IType, OpRef, RType, RvInstr, RvOp, RvOpcode, RvSection,
    SbType, UjType, NIL};

/// Signal raised by a visitor to stop the walk early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkAborted;

/// What a visitor callback returns.
pub type WalkResult = Result<(), WalkAborted>;

/// A traversal over a section's op stream with one callback per
/// instruction format. Passes that share the traversal (the peephole
/// checks, the register-use probes) implement this instead of
/// re-walking the list by hand.
pub trait RvVisitor {
    /// A register-register instruction.
    fn r_instr(&mut self, opcode: RvOpcode, operands: &RType) -> WalkResult {
        let _ = (opcode, operands);
        Ok(())
    }

    /// A register-immediate instruction.
    fn i_instr(&mut self, opcode: RvOpcode, operands: &IType) -> WalkResult {
        let _ = (opcode, operands);
        Ok(())
    }

    /// A branch or store.
    fn sb_instr(&mut self, opcode: RvOpcode, operands: &SbType) -> WalkResult {
        let _ = (opcode, operands);
        Ok(())
    }

    /// An upper-immediate or jump instruction.
    fn uj_instr(&mut self, opcode: RvOpcode, operands: &UjType) -> WalkResult {
        let _ = (opcode, operands);
        Ok(())
    }

    /// A label definition.
    fn label(&mut self, label: usize) -> WalkResult {
        let _ = label;
        Ok(())
    }

    /// A directive.
    fn directive(&mut self, op: &RvOp) -> WalkResult {
        let _ = op;
        Ok(())
    }
}

fn visit<V: RvVisitor>(visitor: &mut V, op: &RvOp) -> WalkResult {
    match op {
        RvOp::Instr(RvInstr::R { opcode, operands }) => visitor.r_instr(*opcode, operands),
        RvOp::Instr(RvInstr::I { opcode, operands }) => visitor.i_instr(*opcode, operands),
        RvOp::Instr(RvInstr::Sb { opcode, operands }) => {
            visitor.sb_instr(*opcode, operands)
        }
        RvOp::Instr(RvInstr::Uj { opcode, operands }) => {
            visitor.uj_instr(*opcode, operands)
        }
        RvOp::Label(label) => visitor.label(*label),
        directive => visitor.directive(directive),
    }
}

/// Walk the ops from `from` up to and including `to`.
///
/// `Err(WalkAborted)` reports that the visitor stopped the walk; a
/// completed walk returns `Ok`.
pub fn walk_from_to<V: RvVisitor>(
    section: &RvSection,
    visitor: &mut V,
    from: OpRef,
    to: OpRef,
) -> WalkResult {
    let mut ptr = from;
    while ptr != NIL {
        let node = section.node(ptr);
        visit(visitor, &node.op)?;
        if ptr == to {
            break;
        }
        ptr = node.next;
    }
    Ok(())
}

/// Walk the whole section.
pub fn walk<V: RvVisitor>(section: &RvSection, visitor: &mut V) -> WalkResult {
    walk_from_to(section, visitor, section.first_op(), section.last_op())
}
