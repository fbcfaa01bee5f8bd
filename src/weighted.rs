//! Weighted random choice.
//!
//! Two flavours of the same contract, "return index `i` with probability
//! `w[i] / Σw`":
//!
//! - [`weighted_choose`] and [`WeightedSampler`] take `f64` weights and are
//!   meant for caller-facing sampling (see [`crate::random::sample`]).
//! - [`weighted_choose_exact`] takes [`BigUint`] weights and draws an exact
//!   uniform integer below the total with [`uniform_below`]. Every counting
//!   table in the crate goes through this path, so no rounding ever enters
//!   the sampling distribution of a combinatorial object.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rand::Rng;

use crate::error::{CombinatoricsError, Result};

/// Validates `weights` and returns the divisor that keeps their sum finite:
/// 1 normally, the largest weight when the raw sum overflows.
fn weight_scale(weights: &[f64]) -> Result<f64> {
    if weights.is_empty() {
        return Err(CombinatoricsError::invalid("weight list is empty"));
    }
    if let Some((i, w)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(CombinatoricsError::invalid(format!(
            "weight[{i}] = {w} is negative or not finite"
        )));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(CombinatoricsError::invalid("all weights are zero"));
    }
    if total.is_finite() {
        Ok(1.0)
    } else {
        Ok(weights.iter().copied().fold(0.0, f64::max))
    }
}

/// Selects a random index weighted by the given weights.
///
/// Walks the cumulative sum until it exceeds a uniform draw in `[0, Σw)`.
/// For repeated sampling from the same weights, prefer [`WeightedSampler`].
///
/// # Complexity
/// Time: O(n) per sample
///
/// # Errors
/// `InvalidArgument` if `weights` is empty, contains a negative or
/// non-finite value, or sums to zero.
///
/// # Examples
/// ```
/// use u_combinatorics::random::create_rng;
/// use u_combinatorics::weighted::weighted_choose;
/// let mut rng = create_rng(42);
/// let idx = weighted_choose(&[1.0, 2.0, 3.0], &mut rng).unwrap();
/// assert!(idx < 3);
/// ```
pub fn weighted_choose<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Result<usize> {
    let scale = weight_scale(weights)?;
    let total: f64 = weights.iter().map(|w| w / scale).sum();
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w > 0.0 {
            cumulative += w / scale;
            if cumulative > threshold {
                return Ok(i);
            }
        }
    }

    // Rounding left the threshold past the last partial sum.
    Ok(weights.iter().rposition(|&w| w > 0.0).unwrap_or(weights.len() - 1))
}

/// Pre-computed weighted sampler for O(log n) repeated sampling.
///
/// Builds a cumulative distribution table from weights, then uses binary
/// search for each sample.
///
/// # Complexity
/// - Construction: O(n)
/// - Sampling: O(log n)
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    // running sums of `w / scale`
    cumulative: Vec<f64>,
    total: f64,
    scale: f64,
}

impl WeightedSampler {
    /// Creates a new weighted sampler from the given weights.
    ///
    /// # Errors
    /// Same conditions as [`weighted_choose`].
    pub fn new(weights: &[f64]) -> Result<Self> {
        let scale = weight_scale(weights)?;
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut total = 0.0;
        for &w in weights {
            total += w / scale;
            cumulative.push(total);
        }
        Ok(Self {
            cumulative,
            total,
            scale,
        })
    }

    /// Samples a random index according to the weights.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let threshold = rng.random_range(0.0..self.total);
        // First index whose cumulative weight is strictly above the draw;
        // zero-weight entries share their predecessor's value and are skipped.
        let i = self.cumulative.partition_point(|&c| c <= threshold);
        i.min(self.cumulative.len() - 1)
    }

    /// Returns the number of categories.
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// Returns true if there are no categories.
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Returns the total weight; `+inf` if it exceeds `f64::MAX`.
    pub fn total_weight(&self) -> f64 {
        self.total * self.scale
    }
}

// ============================================================================
// Exact big-integer weights
// ============================================================================

/// Uniform integer in `[0, bound)`.
///
/// Bounds that fit in a `u64` use `random_range`; larger bounds draw
/// `bits(bound)` random bits and reject values `>= bound`, which accepts
/// with probability above 1/2 per round.
///
/// # Errors
/// `InvalidArgument` if `bound` is zero.
///
/// # Examples
/// ```
/// use num_bigint::BigUint;
/// use u_combinatorics::random::create_rng;
/// use u_combinatorics::weighted::uniform_below;
/// let mut rng = create_rng(5);
/// let bound = BigUint::from(10u32).pow(40);
/// assert!(uniform_below(&bound, &mut rng).unwrap() < bound);
/// assert!(uniform_below(&BigUint::from(0u32), &mut rng).is_err());
/// ```
pub fn uniform_below<R: Rng + ?Sized>(bound: &BigUint, rng: &mut R) -> Result<BigUint> {
    if bound.is_zero() {
        return Err(CombinatoricsError::invalid("uniform_below needs a positive bound"));
    }
    if let Some(b) = bound.to_u64() {
        return Ok(BigUint::from(rng.random_range(0..b)));
    }
    let bits = bound.bits();
    let byte_len = bits.div_ceil(8) as usize;
    let excess = (byte_len as u64 * 8 - bits) as u32;
    let mut buf = vec![0u8; byte_len];
    loop {
        rng.fill_bytes(&mut buf);
        // Little-endian: the last byte holds the most significant bits.
        if let Some(top) = buf.last_mut() {
            *top &= 0xff_u8 >> excess;
        }
        let candidate = BigUint::from_bytes_le(&buf);
        if &candidate < bound {
            return Ok(candidate);
        }
    }
}

/// Selects index `i` with probability exactly `weights[i] / Σ weights`.
///
/// # Errors
/// `InvalidArgument` if `weights` is empty or every weight is zero.
///
/// # Examples
/// ```
/// use num_bigint::BigUint;
/// use u_combinatorics::random::create_rng;
/// use u_combinatorics::weighted::weighted_choose_exact;
/// let mut rng = create_rng(9);
/// let w = [BigUint::from(0u32), BigUint::from(5u32)];
/// assert_eq!(weighted_choose_exact(&w, &mut rng).unwrap(), 1);
/// ```
pub fn weighted_choose_exact<R: Rng + ?Sized>(weights: &[BigUint], rng: &mut R) -> Result<usize> {
    weighted_choose_refs(weights.iter(), rng)
}

/// [`weighted_choose_exact`] over borrowed weights, so counting tables can
/// offer their entries without cloning them.
pub(crate) fn weighted_choose_refs<'a, I, R>(weights: I, rng: &mut R) -> Result<usize>
where
    I: IntoIterator<Item = &'a BigUint>,
    I::IntoIter: Clone,
    R: Rng + ?Sized,
{
    let weights = weights.into_iter();
    if weights.clone().next().is_none() {
        return Err(CombinatoricsError::invalid("weight list is empty"));
    }
    let total: BigUint = weights.clone().sum();
    if total.is_zero() {
        return Err(CombinatoricsError::invalid("all weights are zero"));
    }
    let threshold = uniform_below(&total, rng)?;
    let mut cumulative = BigUint::zero();
    let mut last_positive = 0;
    for (i, w) in weights.enumerate() {
        if w.is_zero() {
            continue;
        }
        cumulative += w;
        last_positive = i;
        if cumulative > threshold {
            return Ok(i);
        }
    }
    // Unreachable: the cumulative sum ends at `total > threshold`.
    Ok(last_positive)
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::random::create_rng;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn weighted_choose_returns_positive_index(
            seed in 0_u64..10000,
            weights in proptest::collection::vec(0.0_f64..10.0, 1..20),
        ) {
            let mut rng = create_rng(seed);
            match weighted_choose(&weights, &mut rng) {
                Ok(idx) => {
                    prop_assert!(idx < weights.len());
                    prop_assert!(weights[idx] > 0.0);
                }
                Err(_) => prop_assert!(weights.iter().all(|&w| w == 0.0)),
            }
        }

        #[test]
        fn exact_choice_never_picks_zero_weight(
            seed in 0_u64..10000,
            weights in proptest::collection::vec(0_u64..5, 1..12),
        ) {
            let big: Vec<BigUint> = weights.iter().map(|&w| BigUint::from(w)).collect();
            let mut rng = create_rng(seed);
            match weighted_choose_exact(&big, &mut rng) {
                Ok(idx) => prop_assert!(weights[idx] > 0),
                Err(_) => prop_assert!(weights.iter().all(|&w| w == 0)),
            }
        }

        #[test]
        fn uniform_below_in_range(seed in 0_u64..10000, bound in 1_u64..u64::MAX) {
            let mut rng = create_rng(seed);
            let b = BigUint::from(bound);
            prop_assert!(uniform_below(&b, &mut rng).unwrap() < b);
        }
    }
}
