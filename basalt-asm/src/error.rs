/// Word-level encoding and decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The word does not match any instruction pattern recognised under
    /// the selected float model.
    #[error("word {0:#010x} does not decode to a known instruction")]
    BadInstruction(u32),

    /// An operand does not fit its encoding field.
    #[error("operand out of range: {0}")]
    OutOfRange(&'static str),

    /// The record is a pseudo-instruction that only the section encoder
    /// can lower.
    #[error("{0} has no context-free word encoding")]
    NeedsSection(&'static str),

    /// An internal invariant was violated; a bug in the caller or in
    /// this crate.
    #[error("assertion failed: {0}")]
    Assertion(&'static str),
}
