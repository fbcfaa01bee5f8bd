//! Dyck words.
//!
//! A Dyck word of semilength `n` is a sequence of `n` up steps and `n` down
//! steps whose running height never drops below zero. They are counted by
//! the Catalan numbers 1, 1, 2, 5, 14, 42, …
//!
//! [`DyckTable`] counts completions of a partial path:
//!
//! ```text
//! remain(h, 0) = 1 if h = 0, else 0
//! remain(h, s) = remain(h+1, s−1) + [h > 0] · remain(h−1, s−1)
//! ```
//!
//! and [`random_dyck_word`] walks it from `(0, 2n)`, taking each step with
//! probability proportional to the completions behind it.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;
use rand::Rng;

use crate::cache::SharedTable;
use crate::completion::{walk, Branch, CompletionCounts};
use crate::error::{CombinatoricsError, Result};

/// One step of a lattice path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    /// Height goes up by one.
    Up,
    /// Height goes down by one.
    Down,
}

impl Step {
    fn delta(self) -> isize {
        match self {
            Step::Up => 1,
            Step::Down => -1,
        }
    }
}

/// Checks that `steps` is a Dyck word: even length, never below zero,
/// ends at height zero.
pub(crate) fn validate_steps(steps: &[Step]) -> Result<()> {
    if steps.len() % 2 != 0 {
        return Err(CombinatoricsError::invalid(format!(
            "a Dyck word has even length, got {}",
            steps.len()
        )));
    }
    let mut height: isize = 0;
    for (i, step) in steps.iter().enumerate() {
        height += step.delta();
        if height < 0 {
            return Err(CombinatoricsError::invalid(format!(
                "Dyck word drops below zero at step {i}"
            )));
        }
    }
    if height != 0 {
        return Err(CombinatoricsError::invalid(format!(
            "Dyck word ends at height {height}, not 0"
        )));
    }
    Ok(())
}

/// A validated Dyck word.
///
/// Displays as `U`/`D`. Parsing also accepts `X`/`Y` and `(`/`)`.
///
/// # Examples
/// ```
/// use u_combinatorics::DyckWord;
/// let w: DyckWord = "UUDD".parse().unwrap();
/// assert_eq!(w.semilength(), 2);
/// assert_eq!("XYXY".parse::<DyckWord>().unwrap().to_string(), "UDUD");
/// assert!("DU".parse::<DyckWord>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DyckWord(Vec<Step>);

impl DyckWord {
    /// Validates and wraps `steps`.
    ///
    /// # Errors
    /// `InvalidArgument` unless `steps` is a Dyck word.
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        validate_steps(&steps)?;
        Ok(Self(steps))
    }

    /// Number of up steps (half the length).
    pub fn semilength(&self) -> usize {
        self.0.len() / 2
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    /// Heights after each step.
    pub fn heights(&self) -> Vec<usize> {
        let mut height = 0usize;
        self.0
            .iter()
            .map(|step| {
                match step {
                    Step::Up => height += 1,
                    Step::Down => height -= 1,
                }
                height
            })
            .collect()
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.0
    }

    pub(crate) fn from_valid(steps: Vec<Step>) -> Self {
        debug_assert!(validate_steps(&steps).is_ok());
        Self(steps)
    }
}

impl Deref for DyckWord {
    type Target = [Step];

    fn deref(&self) -> &[Step] {
        &self.0
    }
}

impl fmt::Display for DyckWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            f.write_str(match step {
                Step::Up => "U",
                Step::Down => "D",
            })?;
        }
        Ok(())
    }
}

impl FromStr for DyckWord {
    type Err = CombinatoricsError;

    fn from_str(s: &str) -> Result<Self> {
        let steps = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                'U' | 'u' | 'X' | 'x' | '(' => Ok(Step::Up),
                'D' | 'd' | 'Y' | 'y' | ')' => Ok(Step::Down),
                other => Err(CombinatoricsError::invalid(format!(
                    "unexpected character {other:?} in Dyck word"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(steps)
    }
}

// ============================================================================
// Counting
// ============================================================================

static DYCK_TABLE: Lazy<SharedTable<DyckTable>> = Lazy::new(|| SharedTable::new("dyck"));

/// Completion counts `remain(height, steps_left)` for paths of semilength `n`.
///
/// Heights run over `0..=n+1` and steps over `0..=2n`; anything outside
/// reads as zero. Entries are exact for every state of a path of
/// semilength at most `n`.
///
/// # Complexity
/// Time and space O(n²).
#[derive(Debug, Clone)]
pub struct DyckTable {
    n: usize,
    // counts[s * (n + 2) + h]
    counts: Vec<BigUint>,
    zero: BigUint,
}

impl DyckTable {
    pub fn new(n: usize) -> Self {
        let heights = n + 2;
        let mut counts: Vec<BigUint> = Vec::with_capacity((2 * n + 1) * heights);
        for h in 0..heights {
            counts.push(if h == 0 { BigUint::one() } else { BigUint::zero() });
        }
        for s in 1..=2 * n {
            for h in 0..heights {
                let prev = (s - 1) * heights;
                let mut entry = if h + 1 < heights {
                    counts[prev + h + 1].clone()
                } else {
                    BigUint::zero()
                };
                if h > 0 {
                    entry += &counts[prev + h - 1];
                }
                counts.push(entry);
            }
        }
        log::debug!("built dyck table n={n} ({} entries)", counts.len());
        Self {
            n,
            counts,
            zero: BigUint::zero(),
        }
    }

    /// Returns the process-wide table, grown if needed to cover semilength
    /// `n`.
    ///
    /// `remain(h, s)` does not depend on the semilength, and a larger table
    /// only raises the height cap, so any table of semilength `N ≥ n` walks
    /// a word of semilength `n` exactly.
    pub fn shared(n: usize) -> Arc<Self> {
        DYCK_TABLE.get_covering(|t| t.n >= n, |_| Self::new(n))
    }

    /// Largest semilength the table covers.
    pub fn semilength(&self) -> usize {
        self.n
    }

    /// Number of ways to finish a Dyck path from `height` with `steps_left`
    /// steps to place.
    pub fn remain(&self, height: usize, steps_left: usize) -> &BigUint {
        let heights = self.n + 2;
        if height >= heights || steps_left > 2 * self.n {
            return &self.zero;
        }
        &self.counts[steps_left * heights + height]
    }
}

impl CompletionCounts for DyckTable {
    /// (height, steps left)
    type State = (usize, usize);
    type Item = Step;

    fn completions(&self, (h, s): Self::State) -> &BigUint {
        self.remain(h, s)
    }

    fn is_complete(&self, (_, s): Self::State) -> bool {
        s == 0
    }

    fn branches(&self, (h, s): Self::State) -> [Branch<'_, Self::State, Step>; 2] {
        let up = Branch {
            emit: Some(Step::Up),
            next: (h + 1, s - 1),
            weight: self.remain(h + 1, s - 1),
        };
        let down = match h.checked_sub(1) {
            Some(lower) => Branch {
                emit: Some(Step::Down),
                next: (lower, s - 1),
                weight: self.remain(lower, s - 1),
            },
            None => Branch {
                emit: None,
                next: (h, s - 1),
                weight: &self.zero,
            },
        };
        [up, down]
    }
}

/// Number of Dyck words of semilength `n`, the `n`-th Catalan number.
///
/// Uses `C(k+1) = C(k) · 2(2k+1) / (k+2)`, where every division is exact.
///
/// # Complexity
/// O(n) big-integer operations.
///
/// # Examples
/// ```
/// use num_bigint::BigUint;
/// use u_combinatorics::number_dyck_words;
/// let first: Vec<BigUint> = (0..6).map(number_dyck_words).collect();
/// let expected: Vec<BigUint> = [1u32, 1, 2, 5, 14, 42].iter().map(|&c| c.into()).collect();
/// assert_eq!(first, expected);
/// ```
pub fn number_dyck_words(n: usize) -> BigUint {
    let mut c = BigUint::one();
    for k in 0..n {
        c *= BigUint::from(2 * (2 * k + 1));
        c /= BigUint::from(k + 2);
    }
    c
}

/// Uniformly random Dyck word of semilength `n`.
///
/// # Complexity
/// O(n²) the first time the table for `n` is needed, then O(n).
///
/// # Examples
/// ```
/// use u_combinatorics::random::create_rng;
/// use u_combinatorics::random_dyck_word;
/// let mut rng = create_rng(12);
/// let w = random_dyck_word(8, &mut rng);
/// assert_eq!(w.len(), 16);
/// assert!(w.heights().last() == Some(&0));
/// ```
pub fn random_dyck_word<R: Rng + ?Sized>(n: usize, rng: &mut R) -> DyckWord {
    let table = DyckTable::shared(n);
    let steps = walk(table.as_ref(), (0, 2 * n), rng)
        .expect("remain(0, 2n) is a Catalan number and never zero");
    DyckWord::from_valid(steps)
}

// ============================================================================
// Tests
// ============================================================================
