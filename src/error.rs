use crate::compiler::CompileError;


/// Any failure this crate can report, at compile time or at roll time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Explosion would grow a pool past the dice limit while exploding
    /// dice remain unresolved. Raised per invocation, not per compile.
    #[error("Roll limit exceeded: explosion would grow the pool past {max} dice")]
    RollLimitExceeded {
        /// The pool-size bound that was hit.
        max: u16,
    },

    /// The expression failed to compile.
    #[error("Compile error - {0}")]
    Compile(#[from] CompileError),
}
