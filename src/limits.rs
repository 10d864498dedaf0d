//! Fixed resource limits for compilation and evaluation.

/// Maximum length of a normalized expression, in characters.
pub const MAX_EXPRESSION_LENGTH: usize = 60;

/// Maximum number of chunks in one expression.
pub const MAX_CHUNKS: usize = 10;

/// Maximum number of dice in one pool, including dice added by explosion.
pub const MAX_DICE: u16 = 100;

/// Maximum number of faces on one die.
pub const MAX_FACES: u16 = 1000;
