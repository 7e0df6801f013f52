//! A window-1 peephole over the op stream.

use crate::rv32::section::{RvInstr, RvOp, RvOpcode, RvSection, NIL};

/// Remove no-op `addi` instructions.
///
/// `addi zero, zero, 0` is dropped unless it is the fall-through op
/// of a conditional branch, which must keep its successor. An `addi`
/// whose destination equals its source with a zero immediate does
/// nothing on any path and is dropped unconditionally.
pub fn peephole(section: &mut RvSection) {
    let mut prev = NIL;
    let mut ptr = section.first_op();

    while ptr != NIL {
        let node = section.node(ptr);
        let next = node.next;

        let RvOp::Instr(instr) = node.op.clone() else {
            prev = ptr;
            ptr = next;
            continue;
        };

        if let RvInstr::I {
            opcode: RvOpcode::Addi,
            operands,
        } = instr
        {
            if instr.is_nop() {
                let shields_branch = prev != NIL
                    && matches!(
                        &section.node(prev).op,
                        RvOp::Instr(i) if i.is_conditional_branch()
                    );
                if !shields_branch {
                    ptr = section.remove_op(ptr);
                    prev = NIL;
                    continue;
                }
            } else if operands.rd == operands.rs1 && operands.imm == 0 {
                ptr = section.remove_op(ptr);
                prev = NIL;
                continue;
            }
        }

        prev = ptr;
        ptr = next;
    }
}
