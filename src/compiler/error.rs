/// A reason an expression failed to compile. All variants abort the whole
/// compile; no partial evaluator is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The normalized expression exceeds the length limit.
    #[error("Expression too long: {len} characters (max {max})")]
    ExpressionTooLong {
        /// Normalized length in characters.
        len: usize,
        /// The configured maximum.
        max: usize,
    },

    /// The expression splits into more chunks than allowed.
    #[error("Too many chunks: {count} (max {max})")]
    TooManyChunks {
        /// Number of chunks after splitting.
        count: usize,
        /// The configured maximum.
        max: usize,
    },

    /// One or more chunks failed grammar validation. The message lists
    /// every offending chunk.
    #[error("Invalid chunk(s): {0}")]
    InvalidChunk(String),

    /// A die has more faces than allowed.
    #[error("Die too big: {faces} faces (max {max})")]
    DieTooBig {
        /// The requested face count.
        faces: u64,
        /// The configured maximum.
        max: u16,
    },

    /// A pool asks for more dice than allowed.
    #[error("Too many dice: {count} (max {max})")]
    TooManyDice {
        /// The requested dice count.
        count: u64,
        /// The configured maximum.
        max: u16,
    },
}
