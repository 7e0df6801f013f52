//! The RV32 walker shape: an op arena with doubly linked traversal,
//! the window-1 peephole pass, and the register-use probe the call
//! lowering uses to find live virtual registers.

mod peephole;
mod section;
mod used;
mod walker;

pub use peephole::peephole;
pub use section::{
    IType, OpRef, RType, RvInstr, RvOp, RvOpNode, RvOpcode, RvSection, SbType, UjType,
    NIL,
};
pub use used::{regs_used_before, RegSet, MAX_INT_REGS};
pub use walker::{walk, walk_from_to, RvVisitor, WalkAborted, WalkResult};
