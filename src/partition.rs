//! Integer partitions and compositions.
//!
//! # Counting
//!
//! [`PartitionTable`] holds `p(t, k)`, the number of partitions of `t` into
//! parts of size at most `k`, for every `t ≤ n` and `k ≤ max_part`:
//!
//! ```text
//! p(0, k) = 1
//! p(t, 0) = 0                         t > 0
//! p(t, k) = p(t, k−1) + p(t−k, k)     k ≤ t
//! p(t, k) = p(t, t)                   k > t
//! ```
//!
//! Counts are [`BigUint`]; `p(n, n)` already exceeds `u64` at n = 417.
//!
//! # Sampling
//!
//! [`random_partition`] walks the table from `(n, max_part)`. In state
//! `(r, b)` it either emits a part `b` (weight `p(r−b, b)`, the partitions
//! that use at least one `b`) or retires `b` (weight `p(r, b−1)`). Each
//! partition comes out with probability exactly `1 / p(n, max_part)`.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;
use rand::Rng;

use crate::cache::SharedTable;
use crate::completion::{walk, Branch, CompletionCounts};
use crate::error::{CombinatoricsError, Result};
use crate::random::random_combination;

// ============================================================================
// Partition value type
// ============================================================================

/// A partition: positive parts in non-increasing order.
///
/// # Examples
/// ```
/// use u_combinatorics::Partition;
/// let p = Partition::new(vec![3, 1, 1]).unwrap();
/// assert_eq!(p.sum(), 5);
/// assert_eq!(p.conjugate().parts(), &[3, 1, 1]);
/// assert_eq!(p.to_string(), "(3, 1, 1)");
/// assert!(Partition::new(vec![1, 2]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Partition(Vec<usize>);

impl Partition {
    /// Validates and wraps `parts`.
    ///
    /// # Errors
    /// - `InvalidArgument` if a part is zero or the parts increase anywhere.
    /// - `Overflow` if the parts do not sum within `usize`.
    pub fn new(parts: Vec<usize>) -> Result<Self> {
        if let Some(i) = parts.iter().position(|&p| p == 0) {
            return Err(CombinatoricsError::invalid(format!("part {i} is zero")));
        }
        if let Some(i) = parts.windows(2).position(|w| w[0] < w[1]) {
            return Err(CombinatoricsError::invalid(format!(
                "parts must be non-increasing, found {} before {}",
                parts[i],
                parts[i + 1]
            )));
        }
        parts
            .iter()
            .try_fold(0usize, |acc, &p| acc.checked_add(p))
            .ok_or_else(|| CombinatoricsError::Overflow("partition sum exceeds usize".into()))?;
        Ok(Self(parts))
    }

    /// Sorts `parts` into non-increasing order, then validates.
    pub fn from_unsorted(mut parts: Vec<usize>) -> Result<Self> {
        parts.sort_unstable_by(|a, b| b.cmp(a));
        Self::new(parts)
    }

    /// The empty partition of zero.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn parts(&self) -> &[usize] {
        &self.0
    }

    /// The integer being partitioned.
    pub fn sum(&self) -> usize {
        self.0.iter().sum()
    }

    /// Largest part, `None` for the empty partition.
    pub fn largest_part(&self) -> Option<usize> {
        self.0.first().copied()
    }

    /// Conjugate partition: its `i`-th part counts the parts of `self`
    /// larger than `i`. Transposes the Young diagram.
    pub fn conjugate(&self) -> Partition {
        let width = self.largest_part().unwrap_or(0);
        let conj = (0..width)
            .map(|i| self.0.iter().take_while(|&&p| p > i).count())
            .collect();
        Partition(conj)
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl Deref for Partition {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Partition> for Vec<usize> {
    fn from(p: Partition) -> Self {
        p.0
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{part}")?;
        }
        write!(f, ")")
    }
}

// ============================================================================
// Counting table
// ============================================================================

static PARTITION_TABLE: Lazy<SharedTable<PartitionTable>> =
    Lazy::new(|| SharedTable::new("partition"));

/// Number of partitions of every `t ≤ n` into parts `≤ k`, for every
/// `k ≤ max_part`.
///
/// Entries with `k > t` equal `p(t, t)`, so the stored bound is clamped to
/// `min(max_part, n)` without losing information.
///
/// # Complexity
/// Time and space O(n · max_part).
#[derive(Debug, Clone)]
pub struct PartitionTable {
    n: usize,
    max_part: usize,
    // row-major: counts[t * (max_part + 1) + k]
    counts: Vec<BigUint>,
    zero: BigUint,
}

impl PartitionTable {
    /// Builds the table bottom-up.
    pub fn new(n: usize, max_part: usize) -> Self {
        let max_part = max_part.min(n);
        let width = max_part + 1;
        let mut counts: Vec<BigUint> = Vec::with_capacity((n + 1) * width);
        for t in 0..=n {
            for k in 0..=max_part {
                let entry = if t == 0 {
                    BigUint::one()
                } else if k == 0 {
                    BigUint::zero()
                } else if k <= t {
                    &counts[t * width + k - 1] + &counts[(t - k) * width + k]
                } else {
                    counts[t * width + k - 1].clone()
                };
                counts.push(entry);
            }
        }
        log::debug!(
            "built partition table n={n} max_part={max_part} ({} entries)",
            counts.len()
        );
        Self {
            n,
            max_part,
            counts,
            zero: BigUint::zero(),
        }
    }

    /// Returns the process-wide table, grown if needed to cover
    /// `(n, max_part)`. The table may be larger than requested.
    ///
    /// The replacement covers both the old table and the request when that
    /// costs at most twice their combined size; otherwise it covers only the
    /// request, so one long thin table never forces a huge square one.
    pub fn shared(n: usize, max_part: usize) -> Arc<Self> {
        Self::covering(&PARTITION_TABLE, n, max_part)
    }

    fn covering(slot: &SharedTable<Self>, n: usize, max_part: usize) -> Arc<Self> {
        let bound = max_part.min(n);
        slot.get_covering(
            |t| t.n >= n && t.max_part >= bound,
            |prev| {
                let cost = |(n, k): (usize, usize)| (n + 1) * (k + 1);
                let (n, bound) = match prev {
                    Some(p) => {
                        let merged = (p.n.max(n), p.max_part.max(bound));
                        if cost(merged) <= 2 * (cost((p.n, p.max_part)) + cost((n, bound))) {
                            merged
                        } else {
                            (n, bound)
                        }
                    }
                    None => (n, bound),
                };
                Self::new(n, bound)
            },
        )
    }

    /// Largest total the table covers.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Largest part bound the table stores (already clamped to `n`).
    pub fn max_part(&self) -> usize {
        self.max_part
    }

    /// `p(total, bound)`, or `None` outside the table.
    pub fn get(&self, total: usize, bound: usize) -> Option<&BigUint> {
        if total > self.n {
            return None;
        }
        let bound = bound.min(total);
        if bound > self.max_part {
            return None;
        }
        Some(&self.counts[total * (self.max_part + 1) + bound])
    }

    /// `p(total, bound)`.
    ///
    /// # Panics
    /// Panics if `total > n()` or `min(bound, total) > max_part()`.
    pub fn count(&self, total: usize, bound: usize) -> &BigUint {
        self.get(total, bound).unwrap_or_else(|| {
            panic!(
                "p({total}, {bound}) outside table n={} max_part={}",
                self.n, self.max_part
            )
        })
    }
}

impl CompletionCounts for PartitionTable {
    /// (remaining total, current largest allowed part)
    type State = (usize, usize);
    type Item = usize;

    fn completions(&self, (r, b): Self::State) -> &BigUint {
        self.get(r, b).unwrap_or(&self.zero)
    }

    fn is_complete(&self, (r, _): Self::State) -> bool {
        r == 0
    }

    fn branches(&self, (r, b): Self::State) -> [Branch<'_, Self::State, usize>; 2] {
        let include = if (1..=r).contains(&b) {
            Branch {
                emit: Some(b),
                next: (r - b, b),
                weight: self.completions((r - b, b)),
            }
        } else {
            Branch {
                emit: None,
                next: (r, b),
                weight: &self.zero,
            }
        };
        let exclude = if b >= 1 {
            Branch {
                emit: None,
                next: (r, b - 1),
                weight: self.completions((r, b - 1)),
            }
        } else {
            Branch {
                emit: None,
                next: (r, b),
                weight: &self.zero,
            }
        };
        [include, exclude]
    }
}

/// Number of partitions of `n` into parts of size at most `max_part`.
///
/// # Examples
/// ```
/// use num_bigint::BigUint;
/// use u_combinatorics::number_partitions;
/// assert_eq!(number_partitions(5, 5), BigUint::from(7u32));
/// assert_eq!(number_partitions(10, 3), BigUint::from(14u32));
/// assert_eq!(number_partitions(0, 0), BigUint::from(1u32));
/// ```
pub fn number_partitions(n: usize, max_part: usize) -> BigUint {
    PartitionTable::shared(n, max_part).count(n, max_part).clone()
}

// ============================================================================
// Samplers
// ============================================================================

/// Uniformly random partition of `n` into parts of size at most `max_part`.
///
/// A `max_part` larger than `n` behaves like `n`.
///
/// # Errors
/// `InvalidArgument` if `n > 0` and `max_part == 0` (no such partition).
///
/// # Complexity
/// O(n · max_part) the first time a table is needed, then O(n + max_part)
/// weighted choices.
///
/// # Examples
/// ```
/// use u_combinatorics::random::create_rng;
/// use u_combinatorics::random_partition;
/// let mut rng = create_rng(1);
/// let p = random_partition(20, 4, &mut rng).unwrap();
/// assert_eq!(p.sum(), 20);
/// assert!(p.iter().all(|&part| part <= 4));
/// ```
pub fn random_partition<R: Rng + ?Sized>(n: usize, max_part: usize, rng: &mut R) -> Result<Partition> {
    if n == 0 {
        return Ok(Partition::empty());
    }
    if max_part == 0 {
        return Err(CombinatoricsError::invalid(format!(
            "no partition of n={n} has parts bounded by 0"
        )));
    }
    let table = PartitionTable::shared(n, max_part);
    let parts = walk(table.as_ref(), (n, max_part.min(n)), rng)?;
    Ok(Partition(parts))
}

fn check_parts(n: usize, k: usize) -> Result<()> {
    if k > n {
        return Err(CombinatoricsError::invalid(format!(
            "cannot split n={n} into k={k} positive parts"
        )));
    }
    if k == 0 && n > 0 {
        return Err(CombinatoricsError::invalid(format!(
            "cannot split n={n} into zero parts"
        )));
    }
    Ok(())
}

/// Uniformly random partition of `n` into exactly `k` positive parts.
///
/// Removing one from each part maps these bijectively onto partitions of
/// `n − k` into at most `k` parts, whose conjugates are the partitions of
/// `n − k` into parts at most `k`. The sampler draws one of those and maps
/// it back.
///
/// # Errors
/// `InvalidArgument` if `k > n`, or `k == 0` while `n > 0`.
///
/// # Examples
/// ```
/// use u_combinatorics::random::create_rng;
/// use u_combinatorics::random_partition_with_parts;
/// let mut rng = create_rng(4);
/// let p = random_partition_with_parts(10, 5, &mut rng).unwrap();
/// assert_eq!(p.len(), 5);
/// assert_eq!(p.sum(), 10);
/// ```
pub fn random_partition_with_parts<R: Rng + ?Sized>(n: usize, k: usize, rng: &mut R) -> Result<Partition> {
    check_parts(n, k)?;
    let base = random_partition(n - k, k, rng)?.conjugate();
    let parts = (0..k).map(|i| base.get(i).copied().unwrap_or(0) + 1).collect();
    Ok(Partition(parts))
}

/// Uniformly random composition of `n` into exactly `k` positive parts.
///
/// Stars and bars: a sorted `(k−1)`-subset of the `n−1` gaps between `n`
/// stars marks where the parts end.
///
/// # Errors
/// Same as [`random_partition_with_parts`].
///
/// # Complexity
/// O(k log k)
pub fn random_composition_with_parts<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    check_parts(n, k)?;
    if k == 0 {
        return Ok(Vec::new());
    }
    let cuts = random_combination(n - 1, k - 1, rng)?;
    let mut parts = Vec::with_capacity(k);
    let mut previous = 0;
    for cut in cuts {
        // gap index `cut` sits after star `cut + 1`
        parts.push(cut + 1 - previous);
        previous = cut + 1;
    }
    parts.push(n - previous);
    Ok(parts)
}

/// Uniformly random composition (ordered partition) of `n`.
///
/// Each of the `n − 1` gaps is cut independently with probability 1/2,
/// which is uniform over all `2^(n−1)` compositions.
///
/// # Complexity
/// O(n)
pub fn random_ordered_partition<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut part = 1;
    for _ in 1..n {
        if rng.random_bool(0.5) {
            parts.push(part);
            part = 1;
        } else {
            part += 1;
        }
    }
    parts.push(part);
    parts
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyTable;
    use crate::random::create_rng;

    fn enumerate(n: usize, max_part: usize) -> Vec<Vec<usize>> {
        fn go(rest: usize, bound: usize, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
            if rest == 0 {
                out.push(prefix.clone());
                return;
            }
            for part in (1..=bound.min(rest)).rev() {
                prefix.push(part);
                go(rest - part, part, prefix, out);
                prefix.pop();
            }
        }
        let mut out = Vec::new();
        go(n, max_part, &mut Vec::new(), &mut out);
        out
    }

    #[test]
    fn test_counts_match_enumeration() {
        for n in 0..=12 {
            for max_part in 0..=13 {
                let expected = enumerate(n, max_part).len();
                assert_eq!(
                    number_partitions(n, max_part),
                    BigUint::from(expected),
                    "p({n}, {max_part})"
                );
            }
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(number_partitions(5, 5), BigUint::from(7u32));
        assert_eq!(number_partitions(100, 100), BigUint::from(190_569_292u64));
        assert_eq!(number_partitions(20, 5), BigUint::from(192u32));
        let p1000: BigUint = "24061467864032622473692149727991".parse().unwrap();
        assert_eq!(number_partitions(1000, 1000), p1000);
    }

    #[test]
    fn test_table_invariants() {
        let t = PartitionTable::new(9, 20);
        assert_eq!(t.max_part(), 9);
        for k in 0..=9 {
            assert_eq!(t.count(0, k), &BigUint::one());
        }
        for n in 1..=9 {
            assert!(t.count(n, 0).is_zero());
            assert_eq!(t.count(n, n + 5), t.count(n, n));
        }
        assert!(t.get(10, 1).is_none());
    }

    #[test]
    fn test_size_sweep_keeps_one_covering_table() {
        let slot = SharedTable::new("partition");
        for n in 1..=200 {
            let k = 1 + n % 7;
            PartitionTable::covering(&slot, n - k.min(n), k);
            PartitionTable::covering(&slot, n, n);
        }
        let live = slot.current().unwrap();
        assert_eq!((live.n(), live.max_part()), (200, 200));
        let again = PartitionTable::covering(&slot, 57, 13);
        assert!(Arc::ptr_eq(&again, &live));
        assert_eq!(again.count(100, 100), &BigUint::from(190_569_292u64));
    }

    #[test]
    fn test_thin_request_replaces_instead_of_squaring() {
        let slot = SharedTable::new("partition");
        PartitionTable::covering(&slot, 100, 100);
        let thin = PartitionTable::covering(&slot, 5000, 1);
        assert_eq!((thin.n(), thin.max_part()), (5000, 1));
        assert_eq!(thin.count(5000, 1), &BigUint::one());
    }

    #[test]
    fn test_shared_table_grows_with_both_dimensions() {
        let t = PartitionTable::shared(40, 3);
        assert!(t.n() >= 40 && t.max_part() >= 3);
        let t = PartitionTable::shared(20, 20);
        assert!(t.n() >= 20 && t.max_part() >= 20);
        assert_eq!(t.count(20, 20), &BigUint::from(627u32));
        assert_eq!(t.count(20, 5), &BigUint::from(192u32));
    }

    #[test]
    fn test_random_partition_is_uniform() {
        let all = enumerate(8, 4);
        assert_eq!(all.len(), 15);
        let mut rng = create_rng(2024);
        let table = FrequencyTable::from_trials(15_000, || {
            random_partition(8, 4, &mut rng).unwrap().into_vec()
        });
        assert_eq!(table.distinct(), 15);
        let test = table.chi_squared_uniform(all.len()).unwrap();
        assert!(test.passes(1e-4), "chi-squared p = {}", test.p_value);
    }

    #[test]
    fn test_random_partition_respects_bounds() {
        let mut rng = create_rng(3);
        for _ in 0..200 {
            let p = random_partition(30, 7, &mut rng).unwrap();
            assert_eq!(p.sum(), 30);
            assert!(p.iter().all(|&x| (1..=7).contains(&x)));
            assert!(p.windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn test_random_partition_edge_cases() {
        let mut rng = create_rng(0);
        assert!(random_partition(0, 0, &mut rng).unwrap().is_empty());
        assert!(random_partition(0, 5, &mut rng).unwrap().is_empty());
        assert!(matches!(
            random_partition(3, 0, &mut rng),
            Err(CombinatoricsError::InvalidArgument(_))
        ));
        assert_eq!(random_partition(4, 1, &mut rng).unwrap().parts(), &[1, 1, 1, 1]);
        assert_eq!(random_partition(1, 9, &mut rng).unwrap().parts(), &[1]);
    }

    #[test]
    fn test_random_partition_large_n() {
        let mut rng = create_rng(10);
        let p = random_partition(600, 600, &mut rng).unwrap();
        assert_eq!(p.sum(), 600);
    }

    #[test]
    fn test_with_parts_shape() {
        let mut rng = create_rng(9);
        for _ in 0..100 {
            let p = random_partition_with_parts(10, 5, &mut rng).unwrap();
            assert_eq!(p.len(), 5);
            assert_eq!(p.sum(), 10);
            assert!(p.iter().all(|&x| x >= 1));
        }
        assert_eq!(random_partition_with_parts(4, 4, &mut rng).unwrap().parts(), &[1, 1, 1, 1]);
        assert_eq!(random_partition_with_parts(4, 1, &mut rng).unwrap().parts(), &[4]);
        assert!(random_partition_with_parts(0, 0, &mut rng).unwrap().is_empty());
        assert!(random_partition_with_parts(3, 4, &mut rng).is_err());
        assert!(random_partition_with_parts(3, 0, &mut rng).is_err());
    }

    #[test]
    fn test_with_parts_is_uniform() {
        // Partitions of 10 into exactly 3 parts: 8 of them.
        let expected = enumerate(10, 10).into_iter().filter(|p| p.len() == 3).count();
        assert_eq!(expected, 8);
        let mut rng = create_rng(55);
        let table = FrequencyTable::from_trials(8_000, || {
            random_partition_with_parts(10, 3, &mut rng).unwrap()
        });
        assert_eq!(table.distinct(), 8);
        let test = table.chi_squared_uniform(expected).unwrap();
        assert!(test.passes(1e-4), "chi-squared p = {}", test.p_value);
    }

    #[test]
    fn test_composition_with_parts_is_uniform() {
        // C(5, 2) = 10 compositions of 6 into 3 parts.
        let mut rng = create_rng(71);
        let table = FrequencyTable::from_trials(10_000, || {
            let c = random_composition_with_parts(6, 3, &mut rng).unwrap();
            assert_eq!(c.len(), 3);
            assert_eq!(c.iter().sum::<usize>(), 6);
            assert!(c.iter().all(|&x| x >= 1));
            c
        });
        assert_eq!(table.distinct(), 10);
        let test = table.chi_squared_uniform(10).unwrap();
        assert!(test.passes(1e-4), "chi-squared p = {}", test.p_value);
    }

    #[test]
    fn test_composition_edge_cases() {
        let mut rng = create_rng(1);
        assert_eq!(random_composition_with_parts(5, 1, &mut rng).unwrap(), vec![5]);
        assert_eq!(random_composition_with_parts(3, 3, &mut rng).unwrap(), vec![1, 1, 1]);
        assert!(random_composition_with_parts(0, 0, &mut rng).unwrap().is_empty());
        assert!(random_composition_with_parts(2, 3, &mut rng).is_err());
    }

    #[test]
    fn test_ordered_partition_is_uniform() {
        let mut rng = create_rng(8);
        let table = FrequencyTable::from_trials(16_000, || random_ordered_partition(5, &mut rng));
        assert_eq!(table.distinct(), 16);
        let test = table.chi_squared_uniform(16).unwrap();
        assert!(test.passes(1e-4), "chi-squared p = {}", test.p_value);
        assert!(random_ordered_partition(0, &mut rng).is_empty());
        assert_eq!(random_ordered_partition(1, &mut rng), vec![1]);
    }

    #[test]
    fn test_partition_validation() {
        assert!(Partition::new(vec![2, 0]).is_err());
        assert!(Partition::new(vec![1, 3]).is_err());
        assert!(matches!(
            Partition::new(vec![usize::MAX, 1]),
            Err(CombinatoricsError::Overflow(_))
        ));
        assert_eq!(Partition::from_unsorted(vec![1, 3, 2]).unwrap().parts(), &[3, 2, 1]);
        assert_eq!(Partition::empty().to_string(), "()");
        assert_eq!(Partition::new(vec![4, 2, 2, 1]).unwrap().conjugate().parts(), &[4, 3, 1, 1]);
    }
}
