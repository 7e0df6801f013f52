use std::io;
use std::path::PathBuf;

/// Code generation failures.
///
/// Logic errors (`BadAlignment`, `Assertion`) indicate compiler bugs
/// and halt the compilation; I/O errors are kept distinct so the
/// driver can report something actionable to the user.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A word-level encode or decode failure.
    #[error(transparent)]
    Asm(#[from] basalt_asm::Error),

    /// A 32-bit word access at a non-multiple-of-4 offset.
    #[error("misaligned word access at offset {0:#x}")]
    BadAlignment(usize),

    /// An `ADR` target distance has no rotated-immediate encoding;
    /// the caller must split the address computation or spill.
    #[error("ADR target {dist} bytes away cannot be encoded")]
    BadAdr {
        /// The out-of-reach distance, in bytes.
        dist: i64,
    },

    /// An immediate a builder was asked to materialise has no
    /// rotated-immediate encoding.
    #[error("immediate {0:#x} has no rotated encoding")]
    BadImmediate(u32),

    /// An internal invariant was violated.
    #[error("assertion failed: {0}")]
    Assertion(&'static str),

    /// The output file could not be created.
    #[error("failed to open {path}")]
    FileOpen {
        /// The path that could not be opened.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The output file could not be written.
    #[error("failed to write output file")]
    FileWrite {
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}
