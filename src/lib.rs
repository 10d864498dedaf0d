#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]

//! Compiles dice-notation expressions into reusable roll evaluators.
//!
//! An expression is a `+`/`-` joined sequence of chunks: integer constants
//! and dice pools like `4d6`, `3dF` (Fudge), `d%` (percentile), each with at
//! most one modifier: keep/drop (`kh`/`kl`/`dh`/`dl`), reroll (`r`),
//! count-twice (`t`) or explode (`!`). Compiling is done once; the returned
//! [`Evaluator`] can be rolled any number of times, drawing fresh randomness
//! from an injectable [`RollSource`] on every invocation.
//!
//! ```
//! use dicemill::compile;
//!
//! let attack = compile("4d6kh3+2")?;
//! assert!((5..=20).contains(&attack.roll()?));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Tests (or replays) substitute the randomness with a closure:
//!
//! ```
//! use dicemill::{compile, ChunkOutput, FnSource};
//!
//! let mut loaded = FnSource(|faces| faces); // every die rolls its maximum
//! let breakdown = compile("2d6+1")?.breakdown_with(&mut loaded)?;
//! assert_eq!(breakdown, vec![ChunkOutput::Pool(vec![6, 6]), ChunkOutput::Constant(1)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```


#[cfg(test)]
mod pool_test_strategies;

mod compiler;
mod error;
mod eval;
mod limits;
mod pool;
mod source;

pub use compiler::{compile, CompileError};
pub use error::Error;
pub use eval::{ChunkOutput, Evaluator};
pub use limits::{MAX_CHUNKS, MAX_DICE, MAX_EXPRESSION_LENGTH, MAX_FACES};
pub use pool::{DicePool, Faces, Modifier, PoolBuilder};
pub use source::{FnSource, RollSource, ThreadRngSource};
