//! The ARM32 backend: section model, streaming encoder with inline
//! constant pools, cross-section linker, and the inline runtime
//! generators.

mod encode;
mod heap;
mod link;
mod mem;
mod prog;
mod section;

pub use encode::{encode_to_file, encode_to_vec, EncodeOptions, PlatFn};
pub use heap::{
    heap_alloc, heap_free, heap_init, heap_min_size, HEAP_MAX_SLOT, HEAP_MIN_SLOT_SHIFT,
    HEAP_MIN_SLOT_SIZE, HEAP_SLOT_COUNT,
};
pub use link::Linker;
pub use mem::memset_words;
pub use prog::{ArmProg, ConstantData, FloatArch};
pub use section::{ArmOp, ArmSection, IntConstant, RealConstant};
