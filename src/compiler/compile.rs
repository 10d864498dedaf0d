use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;

use super::chunk::compile_chunk;
use super::error::CompileError;
use super::grammar::{normalize, parse_chunk, split_chunks};
use crate::eval::Evaluator;
use crate::limits::{MAX_CHUNKS, MAX_EXPRESSION_LENGTH};


/// Compiled expressions are cached by their *normalized* source string for
/// process lifetime, so whitespace/case variants of one expression share an
/// entry. Entries are never evicted; concurrent compiles of the same
/// expression may race and insert equal evaluators (last write wins).
static EXPR_CACHE: Lazy<Mutex<HashMap<String, Evaluator>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Compiles a dice-notation expression into a reusable [`Evaluator`].
///
/// The expression is normalized (whitespace stripped, lower-cased), split
/// into signed chunks, validated against the chunk grammar and compiled
/// chunk by chunk. Nothing is rolled here; every [`Evaluator`] invocation
/// draws fresh randomness.
///
/// ```
/// use dicemill::compile;
///
/// let evaluator = compile("4d6kh3+2").unwrap();
/// let total = evaluator.roll().unwrap();
/// assert!((5..=20).contains(&total));
/// ```
///
/// # Errors
/// - [`CompileError::ExpressionTooLong`] if the normalized expression
///   exceeds [`MAX_EXPRESSION_LENGTH`] characters.
/// - [`CompileError::TooManyChunks`] if it splits into more than
///   [`MAX_CHUNKS`] chunks.
/// - [`CompileError::InvalidChunk`] if any chunk fails the grammar; the
///   message lists every offender.
/// - [`CompileError::DieTooBig`] / [`CompileError::TooManyDice`] if a pool
///   exceeds the face or dice limits.
pub fn compile(expression: &str) -> Result<Evaluator, CompileError> {
    let normalized = normalize(expression);

    if let Some(evaluator) = EXPR_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&normalized)
    {
        return Ok(evaluator.clone());
    }

    let evaluator = compile_normalized(&normalized)?;
    EXPR_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(normalized, evaluator.clone());

    Ok(evaluator)
}

fn compile_normalized(normalized: &str) -> Result<Evaluator, CompileError> {
    let len = normalized.chars().count();
    if len > MAX_EXPRESSION_LENGTH {
        return Err(CompileError::ExpressionTooLong {
            len,
            max: MAX_EXPRESSION_LENGTH,
        });
    }

    let chunks = split_chunks(normalized);
    // Checked on chunk count alone; modifier expansion happens at roll time.
    if chunks.len() > MAX_CHUNKS {
        return Err(CompileError::TooManyChunks {
            count: chunks.len(),
            max: MAX_CHUNKS,
        });
    }

    let mut parsed = Vec::with_capacity(chunks.len());
    let mut invalid = Vec::new();
    for chunk in &chunks {
        match parse_chunk(chunk) {
            Some(p) => parsed.push((*chunk, p)),
            None => invalid.push(*chunk),
        }
    }
    if !invalid.is_empty() {
        return Err(CompileError::InvalidChunk(invalid.join(", ")));
    }

    let compiled = parsed
        .iter()
        .map(|(source, p)| compile_chunk(source, p))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Evaluator::new(normalized, compiled))
}
