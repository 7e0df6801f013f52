//! Machine code generation for the Basalt compiler.
//!
//! The code generator proper (IR tiling, register allocation) hands
//! this crate a program of target-instruction sections. From there:
//!
//! * [`arm32`] turns sections into bytes: a streaming encoder with an
//!   inline constant-pool manager, branch/`ADR` back-patching, a
//!   cross-section linker, and the generators that synthesise the
//!   runtime's heap allocator and memory-fill loops as instruction
//!   records.
//! * [`rv32`] holds the target-independent walker shape used by the
//!   RISC-V port: an op arena with a window-1 peephole pass and the
//!   register-use probe the call lowering needs.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

pub mod arm32;
mod error;
pub mod rv32;

pub use error::Error;
