use std::fmt::Display;
use crate::compiler::CompileError;
use crate::limits::{MAX_DICE, MAX_FACES};
use crate::source::RollSource;
use crate::Error;


/// The face specification of a die: plain numeric sides, or one of the two
/// symbolic kinds dice notation supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Faces {
    /// A numeric die: values in `[1, n]`.
    Sides(u16),
    /// A Fudge/Fate die: a 3-face roll offset by −2, values in `[-1, 1]`.
    Fudge,
    /// A percentile die: alias for 100 faces, values in `[1, 100]`.
    Percentile,
}

impl Faces {
    /// Number of physical faces handed to the randomness source.
    pub fn count(self) -> u16 {
        match self {
            Faces::Sides(n) => n,
            Faces::Fudge => 3,
            Faces::Percentile => 100,
        }
    }

    /// Value added to every raw roll of this die.
    pub fn offset(self) -> i32 {
        match self {
            Faces::Fudge => -2,
            Faces::Sides(_) | Faces::Percentile => 0,
        }
    }

    /// The lowest value one die can show.
    pub fn lowest(self) -> i32 {
        1 + self.offset()
    }

    /// The highest value one die can show.
    pub fn highest(self) -> i32 {
        i32::from(self.count()) + self.offset()
    }
}

impl Display for Faces {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faces::Sides(n) => write!(f, "{n}"),
            Faces::Fudge => write!(f, "f"),
            Faces::Percentile => write!(f, "%"),
        }
    }
}


/// A pool transformation applied to the rolled dice before the chunk's sign.
///
/// At most one modifier applies per pool. Targets are face *values* (so they
/// can be negative for Fudge dice); keep/drop counts are dice counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Modifier {
    /// Every die showing `target` is rerolled once, non-recursively.
    Reroll {
        /// The face value that triggers a reroll.
        target: i32,
    },

    /// Every die showing `target` is counted twice, in place.
    CountTwice {
        /// The face value that is duplicated.
        target: i32,
    },

    /// Every die showing `target` rolls one extra die, chaining until no new
    /// die shows `target` or the pool would outgrow [`MAX_DICE`].
    Explode {
        /// The face value that explodes.
        target: i32,
    },

    /// Keeps only the `n` highest (or lowest) dice.
    Keep {
        /// If `true`, the `n` highest dice are kept, otherwise the `n` lowest.
        highest: bool,
        /// The number of dice to keep.
        n: u16,
    },

    /// Discards the `n` highest (or lowest) dice.
    Drop {
        /// If `true`, the `n` highest dice are dropped, otherwise the `n` lowest.
        highest: bool,
        /// The number of dice to drop.
        n: u16,
    },

    /// No transformation; the pool passes through unchanged.
    #[default]
    None,
}

impl Modifier {
    /// Creates a [`Modifier::Reroll`] with the given target face value.
    pub fn reroll(target: i32) -> Self {
        Modifier::Reroll { target }
    }

    /// Creates a [`Modifier::CountTwice`] with the given target face value.
    pub fn twice(target: i32) -> Self {
        Modifier::CountTwice { target }
    }

    /// Creates a [`Modifier::Explode`] with the given target face value.
    pub fn explode(target: i32) -> Self {
        Modifier::Explode { target }
    }

    /// Creates a [`Modifier::Keep`] mode to keep the `n` highest dice.
    pub fn kh(n: u16) -> Self {
        Modifier::Keep { highest: true, n }
    }

    /// Creates a [`Modifier::Keep`] mode to keep the `n` lowest dice.
    pub fn kl(n: u16) -> Self {
        Modifier::Keep { highest: false, n }
    }

    /// Creates a [`Modifier::Drop`] mode to drop the `n` highest dice.
    pub fn dh(n: u16) -> Self {
        Modifier::Drop { highest: true, n }
    }

    /// Creates a [`Modifier::Drop`] mode to drop the `n` lowest dice.
    pub fn dl(n: u16) -> Self {
        Modifier::Drop { highest: false, n }
    }

    /// Applies this modifier to an in-progress pool.
    ///
    /// `die` rolls one fresh die of the owning pool's faces, offset applied;
    /// only reroll and explode ever invoke it.
    pub(crate) fn apply(
        &self,
        rolls: Vec<i32>,
        die: &mut dyn FnMut() -> i32,
    ) -> Result<Vec<i32>, Error> {
        match *self {
            Modifier::None => Ok(rolls),

            Modifier::Reroll { target } => Ok(rolls
                .into_iter()
                .map(|v| if v == target { die() } else { v })
                .collect()),

            Modifier::CountTwice { target } => {
                let mut out = Vec::with_capacity(rolls.len());
                for v in rolls {
                    out.push(v);
                    if v == target {
                        out.push(v);
                    }
                }
                Ok(out)
            }

            Modifier::Explode { target } => explode(rolls, target, die),

            Modifier::Keep { highest, n } => Ok(keep(rolls, highest, usize::from(n))),

            Modifier::Drop { highest, n } => Ok(drop_extreme(rolls, highest, usize::from(n))),
        }
    }
}

impl Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modifier::Reroll { target } => write!(f, "r{target}"),
            Modifier::CountTwice { target } => write!(f, "t{target}"),
            Modifier::Explode { target } => write!(f, "!{target}"),
            Modifier::Keep { highest, n } => write!(f, "k{}{n}", if *highest { "h" } else { "l" }),
            Modifier::Drop { highest, n } => write!(f, "d{}{n}", if *highest { "h" } else { "l" }),
            Modifier::None => Ok(()),
        }
    }
}


/// The implied count for a keep/drop modifier written without an argument:
/// keep (or drop) all but the extreme one.
///
/// Takes the pool's face bounds like the other default resolvers but reads
/// only the count; keep/drop operate on dice counts, not face values.
pub(crate) fn default_keep_drop(count: u16, _lowest: i32, _highest: i32) -> u16 {
    1.min(count.saturating_sub(1))
}

fn keep(rolls: Vec<i32>, highest: bool, n: usize) -> Vec<i32> {
    let mut sorted = rolls;
    if highest {
        sorted.sort_by(|a, b| b.cmp(a));
    } else {
        sorted.sort_unstable();
    }
    sorted.truncate(n);
    sorted
}

fn drop_extreme(rolls: Vec<i32>, highest: bool, n: usize) -> Vec<i32> {
    let mut sorted = rolls;
    if highest {
        sorted.sort_by(|a, b| b.cmp(a));
    } else {
        sorted.sort_unstable();
    }
    sorted.split_off(n.min(sorted.len()))
}

fn explode(rolls: Vec<i32>, target: i32, die: &mut dyn FnMut() -> i32) -> Result<Vec<i32>, Error> {
    // Bound covers the whole pool: originals plus every die added here.
    let mut budget = usize::from(MAX_DICE).saturating_sub(rolls.len());
    let mut out = Vec::with_capacity(rolls.len());

    for v in rolls {
        out.push(v);
        let mut last = v;
        while last == target {
            if budget == 0 {
                return Err(Error::RollLimitExceeded { max: MAX_DICE });
            }
            last = die();
            out.push(last);
            budget -= 1;
        }
    }

    Ok(out)
}


/// One compiled dice-pool term: count, faces, sign and modifier, fully
/// resolved. Rolling it draws fresh randomness on every invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DicePool {
    pub(crate) count: u16,
    pub(crate) faces: Faces,
    pub(crate) negative: bool,
    pub(crate) modifier: Modifier,
}

impl DicePool {
    /// Creates a new [`PoolBuilder`] for dice with the given faces.
    ///
    /// # Examples
    /// ```
    /// use dicemill::{DicePool, Faces, Modifier};
    ///
    /// let pool = DicePool::builder(Faces::Sides(6))
    ///     .count(4)
    ///     .modifier(Modifier::kh(3))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(pool.to_string(), "4d6kh3");
    /// ```
    pub fn builder(faces: Faces) -> PoolBuilder {
        PoolBuilder::new(faces)
    }

    /// Rolls the full pool, applies the modifier, then applies the sign.
    ///
    /// Base dice draw from `source` first, in pool order; reroll and explode
    /// resolution draw afterwards.
    ///
    /// # Errors
    /// Returns [`Error::RollLimitExceeded`] if explosion would grow the pool
    /// past [`MAX_DICE`].
    pub fn roll_with<S: RollSource>(&self, source: &mut S) -> Result<Vec<i32>, Error> {
        let faces = self.faces.count();
        let offset = self.faces.offset();
        let mut die = || i32::from(source.roll_die(faces)) + offset;

        let base: Vec<i32> = (0..self.count).map(|_| die()).collect();
        let mut rolls = self.modifier.apply(base, &mut die)?;

        if self.negative {
            for v in &mut rolls {
                *v = -*v;
            }
        }

        Ok(rolls)
    }
}

impl Display for DicePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "{}d{}{}", self.count, self.faces, self.modifier)
    }
}


/// A builder for creating [`DicePool`] instances outside the compiler,
/// enforcing the same limits the chunk compiler enforces.
#[derive(Debug, Clone)]
pub struct PoolBuilder {
    count: u16,
    faces: Faces,
    negative: bool,
    modifier: Modifier,
}

impl PoolBuilder {
    fn new(faces: Faces) -> Self {
        Self {
            count: 1,
            faces,
            negative: false,
            modifier: Modifier::None,
        }
    }

    /// Sets the number of dice to roll. Defaults to 1.
    pub fn count(mut self, count: u16) -> Self {
        self.count = count;
        self
    }

    /// Marks the pool as a subtracted term: every result is negated.
    pub fn negative(mut self, negative: bool) -> Self {
        self.negative = negative;
        self
    }

    /// Sets the modifier for the pool.
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = modifier;
        self
    }

    /// Sets the modifier to keep the `n` highest dice.
    pub fn kh(self, n: u16) -> Self {
        self.modifier(Modifier::kh(n))
    }

    /// Sets the modifier to keep the `n` lowest dice.
    pub fn kl(self, n: u16) -> Self {
        self.modifier(Modifier::kl(n))
    }

    /// Sets the modifier to drop the `n` highest dice.
    pub fn dh(self, n: u16) -> Self {
        self.modifier(Modifier::dh(n))
    }

    /// Sets the modifier to drop the `n` lowest dice.
    pub fn dl(self, n: u16) -> Self {
        self.modifier(Modifier::dl(n))
    }

    /// Finalizes the configuration and attempts to build a [`DicePool`].
    ///
    /// # Errors
    /// - [`CompileError::TooManyDice`] if `count` exceeds [`MAX_DICE`].
    /// - [`CompileError::DieTooBig`] if numeric faces exceed [`MAX_FACES`].
    /// - [`CompileError::InvalidChunk`] for a zero-faced numeric die.
    pub fn build(self) -> Result<DicePool, CompileError> {
        if self.count > MAX_DICE {
            return Err(CompileError::TooManyDice {
                count: u64::from(self.count),
                max: MAX_DICE,
            });
        }
        if let Faces::Sides(faces) = self.faces {
            if faces == 0 {
                return Err(CompileError::InvalidChunk("0-faced die".into()));
            }
            if faces > MAX_FACES {
                return Err(CompileError::DieTooBig {
                    faces: u64::from(faces),
                    max: MAX_FACES,
                });
            }
        }

        Ok(DicePool {
            count: self.count,
            faces: self.faces,
            negative: self.negative,
            modifier: self.modifier,
        })
    }
}
