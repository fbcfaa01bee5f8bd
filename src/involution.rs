//! Involutions and Robinson–Schensted insertion.
//!
//! Involutions of `n` elements are counted by
//!
//! ```text
//! I(0) = I(1) = 1
//! I(i) = I(i−1) + (i−1) · I(i−2)
//! ```
//!
//! (the last element is either fixed, or paired with one of the other
//! `i−1`). RSK restricted to involutions is a bijection onto standard Young
//! tableaux of size `n`, which is how [`crate::random_young_tableaux`]
//! samples uniformly over all tableaux at once.

use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;
use rand::Rng;

use crate::cache::SharedTable;
use crate::completion::{walk, Branch, CompletionCounts};
use crate::error::{CombinatoricsError, Result};
use crate::tableau::YoungTableau;

static INVOLUTION_TABLE: Lazy<SharedTable<InvolutionTable>> =
    Lazy::new(|| SharedTable::new("involution"));

/// What happens to the element under consideration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// The element maps to itself.
    Fixed,
    /// The element swaps with one of the elements still unassigned.
    Paired,
}

/// `I(i)` for `i ≤ n`, plus the weight `(i−1) · I(i−2)` of pairing.
#[derive(Debug, Clone)]
pub struct InvolutionTable {
    counts: Vec<BigUint>,
    paired: Vec<BigUint>,
    zero: BigUint,
}

impl InvolutionTable {
    pub fn new(n: usize) -> Self {
        let mut counts: Vec<BigUint> = Vec::with_capacity(n + 1);
        let mut paired: Vec<BigUint> = Vec::with_capacity(n + 1);
        for i in 0..=n {
            let pair_weight = if i >= 2 {
                &counts[i - 2] * BigUint::from(i - 1)
            } else {
                BigUint::zero()
            };
            let count = if i == 0 {
                BigUint::one()
            } else {
                &counts[i - 1] + &pair_weight
            };
            counts.push(count);
            paired.push(pair_weight);
        }
        log::debug!("built involution table n={n}");
        Self {
            counts,
            paired,
            zero: BigUint::zero(),
        }
    }

    /// Returns the process-wide table, grown if needed to cover `n`.
    pub fn shared(n: usize) -> Arc<Self> {
        INVOLUTION_TABLE.get_covering(|t| t.n() >= n, |_| Self::new(n))
    }

    /// Largest `n` the table covers.
    pub fn n(&self) -> usize {
        self.counts.len() - 1
    }

    /// `I(i)`; zero beyond the table.
    pub fn count(&self, i: usize) -> &BigUint {
        self.counts.get(i).unwrap_or(&self.zero)
    }
}

impl CompletionCounts for InvolutionTable {
    /// elements still unassigned
    type State = usize;
    type Item = Pairing;

    fn completions(&self, i: usize) -> &BigUint {
        self.count(i)
    }

    fn is_complete(&self, i: usize) -> bool {
        i == 0
    }

    fn branches(&self, i: usize) -> [Branch<'_, usize, Pairing>; 2] {
        let fixed = Branch {
            emit: Some(Pairing::Fixed),
            next: i - 1,
            weight: self.count(i - 1),
        };
        let paired = Branch {
            emit: Some(Pairing::Paired),
            next: i.saturating_sub(2),
            weight: self.paired.get(i).unwrap_or(&self.zero),
        };
        [fixed, paired]
    }
}

/// Number of involutions of `n` elements: 1, 1, 2, 4, 10, 26, 76, …
pub fn number_involutions(n: usize) -> BigUint {
    InvolutionTable::shared(n).count(n).clone()
}

/// Uniformly random involution of `0..n`, in one-line notation.
///
/// # Examples
/// ```
/// use u_combinatorics::random::create_rng;
/// use u_combinatorics::random_involution;
/// let mut rng = create_rng(6);
/// let p = random_involution(9, &mut rng);
/// assert!((0..9).all(|i| p[p[i]] == i));
/// ```
pub fn random_involution<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let table = InvolutionTable::shared(n);
    let pairings = walk(table.as_ref(), n, rng).expect("I(n) is never zero");
    let mut unassigned: Vec<usize> = (0..n).collect();
    let mut perm = vec![0; n];
    for pairing in pairings {
        let Some(element) = unassigned.pop() else {
            break;
        };
        match pairing {
            Pairing::Fixed => perm[element] = element,
            Pairing::Paired => {
                let partner = unassigned.swap_remove(rng.random_range(0..unassigned.len()));
                perm[element] = partner;
                perm[partner] = element;
            }
        }
    }
    perm
}

/// Insertion tableau of Robinson–Schensted row insertion.
///
/// `word` must be a permutation of `0..n`; the tableau holds `1..=n`.
///
/// # Errors
/// `InvalidArgument` if `word` is not a permutation of `0..word.len()`.
///
/// # Complexity
/// O(n²) in the worst case, O(n log n) binary searches per row.
pub fn rsk_insertion(word: &[usize]) -> Result<YoungTableau> {
    let mut seen = vec![false; word.len()];
    for &x in word {
        if x >= word.len() || std::mem::replace(&mut seen[x], true) {
            return Err(CombinatoricsError::invalid(format!(
                "{word:?} is not a permutation of 0..{}",
                word.len()
            )));
        }
    }
    let mut rows: Vec<Vec<usize>> = Vec::new();
    for &value in word {
        let mut x = value + 1;
        let mut r = 0;
        loop {
            if r == rows.len() {
                rows.push(vec![x]);
                break;
            }
            let row = &mut rows[r];
            let i = row.partition_point(|&v| v < x);
            if i == row.len() {
                row.push(x);
                break;
            }
            x = std::mem::replace(&mut row[i], x);
            r += 1;
        }
    }
    Ok(YoungTableau::from_valid_rows(rows))
}
