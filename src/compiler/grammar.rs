//! Chunk grammar: normalization, the chunk splitter, and the chunk scanner.
//!
//! A chunk is one signed term of an expression: a bare non-negative integer,
//! or a dice pool `[sign][count]d[faces][modifier[arg]]`. The scanner fails
//! closed; anything it does not recognize invalidates the whole chunk.

/// Strips whitespace and lower-cases an expression. Modifier tokens and the
/// Fudge face letter are case-insensitive, so all later stages see the
/// normalized form only.
pub(crate) fn normalize(expression: &str) -> String {
    expression
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Splits a normalized expression into chunk substrings.
///
/// A `+`/`-` starts a new chunk unless the byte before it is `r`, `t` or `!`:
/// those modifiers take an optional signed argument (`dfr-1`), and the sign
/// belongs to the argument, not to a new term. Concatenating the chunks
/// reconstructs the input.
pub(crate) fn split_chunks(expression: &str) -> Vec<&str> {
    let bytes = expression.as_bytes();
    let mut chunks = Vec::new();
    let mut start = 0;

    for i in 1..bytes.len() {
        if matches!(bytes[i], b'+' | b'-') && !matches!(bytes[i - 1], b'r' | b't' | b'!') {
            chunks.push(&expression[start..i]);
            start = i;
        }
    }
    chunks.push(&expression[start..]);

    chunks
}

/// Folds a digit run into a value, saturating instead of overflowing so
/// absurd literals fall through to the limit checks.
pub(crate) fn digits_value(digits: &str) -> u64 {
    digits.bytes().fold(0u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    })
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModifierToken {
    Reroll,
    CountTwice,
    Explode,
    KeepHighest,
    KeepLowest,
    DropHighest,
    DropLowest,
}

impl ModifierToken {
    /// Reroll, count-twice and explode target face values, which may be
    /// negative; keep/drop counts may not.
    fn accepts_signed_arg(self) -> bool {
        matches!(
            self,
            ModifierToken::Reroll | ModifierToken::CountTwice | ModifierToken::Explode
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FaceToken<'a> {
    Sides(&'a str),
    Fudge,
    Percentile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ModifierSpec<'a> {
    pub token: ModifierToken,
    pub negative_arg: bool,
    pub arg: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChunkBody<'a> {
    Constant(&'a str),
    Dice {
        count: Option<&'a str>,
        faces: FaceToken<'a>,
        modifier: Option<ModifierSpec<'a>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedChunk<'a> {
    pub negative: bool,
    pub body: ChunkBody<'a>,
}

/// Validates one chunk against the grammar, returning its parts.
/// `None` means the chunk is invalid and the expression must be rejected.
pub(crate) fn parse_chunk(chunk: &str) -> Option<ParsedChunk<'_>> {
    let mut s = Scanner::new(chunk);

    let negative = match s.peek() {
        Some(b'+') => {
            s.bump();
            false
        }
        Some(b'-') => {
            s.bump();
            true
        }
        _ => false,
    };

    let leading = s.read_digits();
    if s.at_end() {
        let digits = leading?;
        return Some(ParsedChunk {
            negative,
            body: ChunkBody::Constant(digits),
        });
    }

    if s.peek() != Some(b'd') {
        return None;
    }
    s.bump();

    let faces = match s.peek()? {
        b'f' => {
            s.bump();
            FaceToken::Fudge
        }
        b'%' => {
            s.bump();
            FaceToken::Percentile
        }
        b'0'..=b'9' => {
            let digits = s.read_digits()?;
            if digits_value(digits) == 0 {
                return None;
            }
            FaceToken::Sides(digits)
        }
        _ => return None,
    };

    let modifier = if s.at_end() {
        None
    } else {
        Some(read_modifier(&mut s)?)
    };

    if !s.at_end() {
        return None;
    }

    Some(ParsedChunk {
        negative,
        body: ChunkBody::Dice {
            count: leading,
            faces,
            modifier,
        },
    })
}

fn read_modifier<'a>(s: &mut Scanner<'a>) -> Option<ModifierSpec<'a>> {
    let token = match (s.peek()?, s.peek_at(1)) {
        (b'k', Some(b'h')) => {
            s.bump_n(2);
            ModifierToken::KeepHighest
        }
        (b'k', Some(b'l')) => {
            s.bump_n(2);
            ModifierToken::KeepLowest
        }
        (b'd', Some(b'h')) => {
            s.bump_n(2);
            ModifierToken::DropHighest
        }
        (b'd', Some(b'l')) => {
            s.bump_n(2);
            ModifierToken::DropLowest
        }
        (b'r', _) => {
            s.bump();
            ModifierToken::Reroll
        }
        (b't', _) => {
            s.bump();
            ModifierToken::CountTwice
        }
        (b'!', _) => {
            s.bump();
            ModifierToken::Explode
        }
        _ => return None,
    };

    if s.at_end() {
        return Some(ModifierSpec {
            token,
            negative_arg: false,
            arg: None,
        });
    }

    let negative_arg = match s.peek() {
        Some(b'+' | b'-') if !token.accepts_signed_arg() => return None,
        Some(b'+') => {
            s.bump();
            false
        }
        Some(b'-') => {
            s.bump();
            true
        }
        _ => false,
    };

    let arg = s.read_digits()?;
    Some(ModifierSpec {
        token,
        negative_arg,
        arg: Some(arg),
    })
}


#[derive(Debug)]
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + n).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn bump_n(&mut self, n: usize) {
        self.pos += n;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn read_digits(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        (self.pos > start).then(|| &self.input[start..self.pos])
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::compiler::str_test_strategies::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_strips_whitespace_and_case() {
        assert_eq!(normalize(" 4D6 KH3 + 2 "), "4d6kh3+2");
        assert_eq!(normalize("3dF"), "3df");
        assert_eq!(normalize("\t1d% \n- 2"), "1d%-2");
    }

    #[test]
    fn test_split_plain_sum() {
        assert_eq!(
            split_chunks("4d6+1-2d4+2"),
            vec!["4d6", "+1", "-2d4", "+2"]
        );
    }

    #[test]
    fn test_split_keeps_modifier_argument_signs() {
        assert_eq!(split_chunks("dfr-1"), vec!["dfr-1"]);
        assert_eq!(split_chunks("2d6!-1+3"), vec!["2d6!-1", "+3"]);
        assert_eq!(split_chunks("1d4t+2-1"), vec!["1d4t+2", "-1"]);
    }

    #[test]
    fn test_split_after_keep_drop_starts_new_chunk() {
        // kh takes no signed argument, so the sign opens the next term.
        assert_eq!(split_chunks("4d6kh+1"), vec!["4d6kh", "+1"]);
        assert_eq!(split_chunks("4d6kh3-2"), vec!["4d6kh3", "-2"]);
    }

    #[test]
    fn test_split_concatenation_reconstructs_input() {
        for expr in ["4d6+1-2d4+2", "dfr-1", "1+2+3", "-5"] {
            assert_eq!(split_chunks(expr).concat(), expr);
        }
    }

    #[test]
    fn test_parse_constant_chunks() {
        let chunk = parse_chunk("12").unwrap();
        assert!(!chunk.negative);
        assert_eq!(chunk.body, ChunkBody::Constant("12"));

        let chunk = parse_chunk("-7").unwrap();
        assert!(chunk.negative);
        assert_eq!(chunk.body, ChunkBody::Constant("7"));

        let chunk = parse_chunk("+0").unwrap();
        assert_eq!(chunk.body, ChunkBody::Constant("0"));
    }

    #[test]
    fn test_parse_dice_chunk_parts() {
        let chunk = parse_chunk("4d6kh3").unwrap();
        assert_eq!(
            chunk.body,
            ChunkBody::Dice {
                count: Some("4"),
                faces: FaceToken::Sides("6"),
                modifier: Some(ModifierSpec {
                    token: ModifierToken::KeepHighest,
                    negative_arg: false,
                    arg: Some("3"),
                }),
            }
        );
    }

    #[test]
    fn test_parse_default_count_and_argless_modifier() {
        let chunk = parse_chunk("d%!").unwrap();
        assert_eq!(
            chunk.body,
            ChunkBody::Dice {
                count: None,
                faces: FaceToken::Percentile,
                modifier: Some(ModifierSpec {
                    token: ModifierToken::Explode,
                    negative_arg: false,
                    arg: None,
                }),
            }
        );
    }

    #[test]
    fn test_parse_signed_modifier_argument() {
        let chunk = parse_chunk("-2dfr-1").unwrap();
        assert!(chunk.negative);
        assert_eq!(
            chunk.body,
            ChunkBody::Dice {
                count: Some("2"),
                faces: FaceToken::Fudge,
                modifier: Some(ModifierSpec {
                    token: ModifierToken::Reroll,
                    negative_arg: true,
                    arg: Some("1"),
                }),
            }
        );
    }

    #[test]
    fn test_invalid_chunks_fail_closed() {
        for chunk in [
            "", "+", "-", "d", "4d", "x", "2x4", "4d6q", "4d6kh3x", "1d6r-",
            "4d6kh-3", "1d0", "1d00", "dd6", "4dd6", "--2", "1.5", "4 d6",
        ] {
            assert_eq!(parse_chunk(chunk), None, "chunk {chunk:?}");
        }
    }

    #[test]
    fn test_digits_value_saturates() {
        assert_eq!(digits_value("0"), 0);
        assert_eq!(digits_value("1000"), 1000);
        assert_eq!(digits_value("007"), 7);
        assert_eq!(digits_value("99999999999999999999999999999"), u64::MAX);
    }

    proptest! {
        #[test]
        fn test_generated_constant_chunks_parse(chunk in constant_chunk_strategy()) {
            prop_assert!(parse_chunk(&chunk).is_some(), "chunk {chunk:?}");
        }

        #[test]
        fn test_generated_dice_chunks_parse(chunk in dice_chunk_strategy()) {
            prop_assert!(parse_chunk(&chunk).is_some(), "chunk {chunk:?}");
        }

        #[test]
        fn test_generated_expressions_split_cleanly(expr in expression_strategy()) {
            let chunks = split_chunks(&expr);
            prop_assert_eq!(chunks.concat(), expr.clone());
            for chunk in chunks {
                prop_assert!(parse_chunk(chunk).is_some(), "chunk {chunk:?} of {expr:?}");
            }
        }

        #[test]
        fn test_unknown_modifier_letters_fail(letter in "[a-ce-qsu-z]") {
            let chunk = format!("4d6{letter}");
            // Reads as a modifier position; only the recognized tokens pass.
            if !matches!(letter.as_str(), "k" | "d") {
                prop_assert!(parse_chunk(&chunk).is_none());
            }
        }
    }
}
