use std::fmt::Display;
use std::sync::Arc;

use crate::compiler::CompiledChunk;
use crate::source::{RollSource, ThreadRngSource};
use crate::Error;


/// The outcome of one chunk in an unreduced evaluation: a bare scalar for a
/// constant term, the full post-modifier, sign-applied roll array for a
/// dice-pool term.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChunkOutput {
    /// A constant term's value.
    Constant(i32),
    /// A dice-pool term's individual results.
    Pool(Vec<i32>),
}

impl ChunkOutput {
    /// Sums this chunk's contribution to the expression total.
    pub fn total(&self) -> i32 {
        match self {
            ChunkOutput::Constant(v) => *v,
            ChunkOutput::Pool(rolls) => rolls.iter().fold(0, |acc, v| acc.saturating_add(*v)),
        }
    }
}


/// A compiled expression, ready to roll any number of times.
///
/// Cheap to clone; clones share the compiled chunks. Each invocation
/// re-executes every chunk with fresh randomness; nothing about a roll's
/// outcome is ever cached.
///
/// ```
/// use dicemill::{compile, FnSource};
///
/// let evaluator = compile("2d8+3").unwrap();
///
/// let mut scripted = FnSource(|_| 5);
/// assert_eq!(evaluator.roll_with(&mut scripted).unwrap(), 13);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluator {
    source: Arc<str>,
    chunks: Arc<[CompiledChunk]>,
}

impl Evaluator {
    pub(crate) fn new(source: &str, chunks: Vec<CompiledChunk>) -> Self {
        Self {
            source: Arc::from(source),
            chunks: chunks.into(),
        }
    }

    /// The normalized expression this evaluator was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of chunks in the expression.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Rolls the expression and reduces it to a single total, using the
    /// thread-local randomness source.
    ///
    /// # Errors
    /// Returns [`Error::RollLimitExceeded`] if an explosion outgrows the
    /// dice limit.
    pub fn roll(&self) -> Result<i32, Error> {
        self.roll_with(&mut ThreadRngSource::new())
    }

    /// Rolls the expression against an injected source and reduces it to a
    /// single total.
    ///
    /// # Errors
    /// Returns [`Error::RollLimitExceeded`] if an explosion outgrows the
    /// dice limit.
    pub fn roll_with<S: RollSource>(&self, source: &mut S) -> Result<i32, Error> {
        let mut total = 0i32;
        for chunk in self.chunks.iter() {
            match chunk {
                CompiledChunk::Constant(v) => total = total.saturating_add(*v),
                CompiledChunk::Pool(pool) => {
                    for v in pool.roll_with(source)? {
                        total = total.saturating_add(v);
                    }
                }
            }
        }
        Ok(total)
    }

    /// Rolls the expression without reducing, using the thread-local
    /// randomness source: one [`ChunkOutput`] per chunk, in expression
    /// order.
    ///
    /// # Errors
    /// Returns [`Error::RollLimitExceeded`] if an explosion outgrows the
    /// dice limit.
    pub fn breakdown(&self) -> Result<Vec<ChunkOutput>, Error> {
        self.breakdown_with(&mut ThreadRngSource::new())
    }

    /// Rolls the expression against an injected source without reducing.
    ///
    /// # Errors
    /// Returns [`Error::RollLimitExceeded`] if an explosion outgrows the
    /// dice limit.
    pub fn breakdown_with<S: RollSource>(&self, source: &mut S) -> Result<Vec<ChunkOutput>, Error> {
        self.chunks
            .iter()
            .map(|chunk| match chunk {
                CompiledChunk::Constant(v) => Ok(ChunkOutput::Constant(*v)),
                CompiledChunk::Pool(pool) => pool.roll_with(source).map(ChunkOutput::Pool),
            })
            .collect()
    }
}

impl Display for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}
