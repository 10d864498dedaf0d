use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;

use super::error::CompileError;
use super::grammar::{self, ChunkBody, FaceToken, ModifierSpec, ModifierToken, ParsedChunk};
use crate::limits::{MAX_DICE, MAX_FACES};
use crate::pool::{default_keep_drop, DicePool, Faces, Modifier};


/// One compiled term of an expression: a signed constant, or a dice pool
/// with its sign and modifier resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompiledChunk {
    Constant(i32),
    Pool(DicePool),
}

/// Compiled chunks are cached by their exact chunk string for process
/// lifetime. Compilation is pure, so racing writers insert equal values;
/// the cached artifact is the compiled term, never a roll outcome.
static CHUNK_CACHE: Lazy<Mutex<HashMap<String, CompiledChunk>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Compiles one grammar-validated chunk, consulting the chunk cache first.
pub(crate) fn compile_chunk(
    source: &str,
    parsed: &ParsedChunk<'_>,
) -> Result<CompiledChunk, CompileError> {
    if let Some(&chunk) = CHUNK_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(source)
    {
        return Ok(chunk);
    }

    let chunk = build_chunk(parsed)?;
    CHUNK_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(source.to_owned(), chunk);

    Ok(chunk)
}

fn build_chunk(parsed: &ParsedChunk<'_>) -> Result<CompiledChunk, CompileError> {
    match &parsed.body {
        ChunkBody::Constant(digits) => {
            let magnitude = grammar::digits_value(digits).min(i32::MAX as u64) as i32;
            let value = if parsed.negative { -magnitude } else { magnitude };
            Ok(CompiledChunk::Constant(value))
        }

        ChunkBody::Dice {
            count,
            faces,
            modifier,
        } => {
            let count = match count {
                Some(digits) => {
                    let n = grammar::digits_value(digits);
                    if n > u64::from(MAX_DICE) {
                        return Err(CompileError::TooManyDice {
                            count: n,
                            max: MAX_DICE,
                        });
                    }
                    n as u16
                }
                None => 1,
            };

            let faces = match faces {
                FaceToken::Sides(digits) => {
                    let n = grammar::digits_value(digits);
                    if n > u64::from(MAX_FACES) {
                        return Err(CompileError::DieTooBig {
                            faces: n,
                            max: MAX_FACES,
                        });
                    }
                    Faces::Sides(n as u16)
                }
                FaceToken::Fudge => Faces::Fudge,
                FaceToken::Percentile => Faces::Percentile,
            };

            let modifier = match modifier {
                Some(spec) => resolve_modifier(spec, count, faces.lowest(), faces.highest()),
                None => Modifier::None,
            };

            Ok(CompiledChunk::Pool(DicePool {
                count,
                faces,
                negative: parsed.negative,
                modifier,
            }))
        }
    }
}

/// Resolves a modifier token and optional argument into a concrete
/// [`Modifier`], inferring the per-modifier default when no argument was
/// written: reroll targets the lowest face, count-twice and explode target
/// the highest, keep/drop fall back to all-but-one.
fn resolve_modifier(spec: &ModifierSpec<'_>, count: u16, lowest: i32, highest: i32) -> Modifier {
    let target = |default: i32| match spec.arg {
        Some(digits) => {
            let magnitude = grammar::digits_value(digits).min(i32::MAX as u64) as i32;
            if spec.negative_arg {
                -magnitude
            } else {
                magnitude
            }
        }
        None => default,
    };
    let n = |default: u16| match spec.arg {
        Some(digits) => grammar::digits_value(digits).min(u64::from(u16::MAX)) as u16,
        None => default,
    };

    match spec.token {
        ModifierToken::Reroll => Modifier::reroll(target(lowest)),
        ModifierToken::CountTwice => Modifier::twice(target(highest)),
        ModifierToken::Explode => Modifier::explode(target(highest)),
        ModifierToken::KeepHighest => Modifier::kh(n(default_keep_drop(count, lowest, highest))),
        ModifierToken::KeepLowest => Modifier::kl(n(default_keep_drop(count, lowest, highest))),
        ModifierToken::DropHighest => Modifier::dh(n(default_keep_drop(count, lowest, highest))),
        ModifierToken::DropLowest => Modifier::dl(n(default_keep_drop(count, lowest, highest))),
    }
}
