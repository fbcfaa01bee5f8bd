//! Random sources, shuffling, and uniform selection primitives.
//!
//! Provides seeded RNG construction, the process-wide default stream,
//! Fisher-Yates shuffling, random permutations and subsets, and the
//! `sample(lst, weights)` convenience used by callers that just want an
//! element rather than an index.
//!
//! # Reproducibility
//!
//! Every sampler in this crate takes an explicit `rng: &mut R`. For
//! reproducible experiments, build one with [`create_rng`] and a fixed
//! seed. Callers without a stream of their own borrow the process-wide
//! default through [`with_default_rng`]; it is seeded from
//! [`SEED_ENV_VAR`] when that variable holds a valid `u64`, and from OS
//! entropy otherwise.

use std::cell::Cell;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};
use rand::{Rng, SeedableRng};

use crate::error::{CombinatoricsError, Result};
use crate::weighted::{weighted_choose, WeightedSampler};

/// The pseudo-random generator used for the default stream.
///
/// `SmallRng` (Xoshiro256++) is deterministic for a given seed on the same
/// platform. It is not suitable for cryptographic use.
pub type RandomSource = rand::rngs::SmallRng;

/// Environment variable that seeds the default stream on first use.
pub const SEED_ENV_VAR: &str = "U_COMBINATORICS_SEED";

/// Creates a fast, seeded random number generator.
///
/// # Examples
/// ```
/// use u_combinatorics::random::create_rng;
/// use rand::Rng;
/// let mut rng = create_rng(42);
/// let x: f64 = rng.random();
/// assert!(x >= 0.0 && x < 1.0);
/// ```
pub fn create_rng(seed: u64) -> RandomSource {
    RandomSource::seed_from_u64(seed)
}

// ============================================================================
// Process-wide default stream
// ============================================================================

static DEFAULT_SOURCE: Lazy<Mutex<RandomSource>> = Lazy::new(|| Mutex::new(configured_source()));

thread_local! {
    // set while this thread holds DEFAULT_SOURCE inside `with_default_rng`
    static HOLDS_DEFAULT: Cell<bool> = const { Cell::new(false) };
}

/// Locks the default stream, panicking instead of deadlocking when this
/// thread already holds it.
fn lock_default(op: &str) -> MutexGuard<'static, RandomSource> {
    if HOLDS_DEFAULT.with(Cell::get) {
        panic!("{op} called inside with_default_rng; use the rng passed to the closure");
    }
    DEFAULT_SOURCE.lock()
}

struct HeldMarker;

impl HeldMarker {
    fn set() -> Self {
        HOLDS_DEFAULT.with(|h| h.set(true));
        HeldMarker
    }
}

impl Drop for HeldMarker {
    fn drop(&mut self) {
        HOLDS_DEFAULT.with(|h| h.set(false));
    }
}

/// Reads [`SEED_ENV_VAR`], logging and ignoring values that are not a `u64`.
fn seed_from_env() -> Option<u64> {
    let raw = std::env::var(SEED_ENV_VAR).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(e) => {
            log::warn!("ignoring {SEED_ENV_VAR}={raw:?}: {e}");
            None
        }
    }
}

fn configured_source() -> RandomSource {
    match seed_from_env() {
        Some(seed) => {
            log::debug!("default random stream seeded from {SEED_ENV_VAR}={seed}");
            create_rng(seed)
        }
        None => {
            log::debug!("default random stream seeded from OS entropy");
            RandomSource::from_os_rng()
        }
    }
}

/// Runs `f` with exclusive access to the process-wide default stream.
///
/// The lock is held for the whole closure, so one operation consumes a
/// contiguous slice of the stream even when other threads share it.
///
/// # Panics
/// Panics if `f` calls `with_default_rng`, [`seed_default_rng`] or
/// [`reset_default_rng`] on the same thread; the stream is already lent out
/// as `f`'s argument.
///
/// # Examples
/// ```
/// use u_combinatorics::random::{seed_default_rng, with_default_rng};
/// use u_combinatorics::random_ordered_partition;
///
/// seed_default_rng(7);
/// let parts = with_default_rng(|rng| random_ordered_partition(6, rng));
/// assert_eq!(parts.iter().sum::<usize>(), 6);
/// ```
pub fn with_default_rng<T>(f: impl FnOnce(&mut RandomSource) -> T) -> T {
    let mut guard = lock_default("with_default_rng");
    let _held = HeldMarker::set();
    f(&mut guard)
}

/// Reseeds the default stream deterministically.
pub fn seed_default_rng(seed: u64) {
    log::debug!("default random stream reseeded with {seed}");
    *lock_default("seed_default_rng") = create_rng(seed);
}

/// Resets the default stream to its configured initial state.
///
/// With [`SEED_ENV_VAR`] set this replays the same sequence as a fresh
/// process; otherwise the stream is reseeded from OS entropy.
pub fn reset_default_rng() {
    let source = configured_source();
    *lock_default("reset_default_rng") = source;
}

// ============================================================================
// Shuffles, permutations, subsets
// ============================================================================

/// Fisher-Yates (Durstenfeld) in-place shuffle.
///
/// Produces a uniformly random permutation: each of the n! orderings is
/// equally likely.
///
/// Reference: Knuth (1997), *TAOCP* Vol. 2, §3.4.2, Algorithm P.
///
/// # Complexity
/// Time: O(n), Space: O(1) (in-place)
pub fn shuffle<T, R: Rng + ?Sized>(slice: &mut [T], rng: &mut R) {
    let n = slice.len();
    if n <= 1 {
        return;
    }
    for i in (1..n).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

/// Returns a shuffled index permutation of `[0, n)`.
///
/// # Complexity
/// Time: O(n), Space: O(n)
pub fn shuffled_indices<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    shuffle(&mut indices, rng);
    indices
}

/// Uniformly random permutation of `0..n`, in one-line notation.
///
/// # Examples
/// ```
/// use u_combinatorics::random::{create_rng, random_permutation};
/// let mut rng = create_rng(3);
/// let mut p = random_permutation(5, &mut rng);
/// p.sort_unstable();
/// assert_eq!(p, vec![0, 1, 2, 3, 4]);
/// ```
pub fn random_permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    shuffled_indices(n, rng)
}

/// Uniformly random `k`-subset of `0..n`, in the order the elements were drawn.
///
/// Runs only the first `k` steps of a forward Fisher-Yates pass.
///
/// # Errors
/// `InvalidArgument` if `k > n`.
///
/// # Complexity
/// Time: O(n) for the index vector plus O(k) swaps.
pub fn random_subset<R: Rng + ?Sized>(n: usize, k: usize, rng: &mut R) -> Result<Vec<usize>> {
    if k > n {
        return Err(CombinatoricsError::invalid(format!(
            "subset size k={k} exceeds universe size n={n}"
        )));
    }
    let mut pool: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = rng.random_range(i..n);
        pool.swap(i, j);
    }
    pool.truncate(k);
    Ok(pool)
}

/// Uniformly random `k`-subset of `0..n`, sorted ascending.
///
/// Uses Floyd's algorithm, so memory is O(k) regardless of `n`.
///
/// Reference: Bentley & Floyd (1987), "Programming Pearls: A Sample of
/// Brilliance", *CACM* 30(9).
///
/// # Errors
/// `InvalidArgument` if `k > n`.
///
/// # Complexity
/// Time: O(k log k), Space: O(k)
pub fn random_combination<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if k > n {
        return Err(CombinatoricsError::invalid(format!(
            "combination size k={k} exceeds universe size n={n}"
        )));
    }
    let mut chosen = std::collections::HashSet::with_capacity(k);
    for i in (n - k)..n {
        let t = rng.random_range(0..=i);
        if !chosen.insert(t) {
            chosen.insert(i);
        }
    }
    let mut out: Vec<usize> = chosen.into_iter().collect();
    out.sort_unstable();
    Ok(out)
}

/// Picks an element of `items`, uniformly or with probability proportional
/// to `weights`.
///
/// # Errors
/// `InvalidArgument` if `items` is empty, if `weights` has a different
/// length, or if the weights are rejected by [`weighted_choose`].
///
/// # Examples
/// ```
/// use u_combinatorics::random::{create_rng, sample};
/// let mut rng = create_rng(1);
/// let pick = sample(&["a", "b", "c"], Some(&[1.0, 0.0, 0.0]), &mut rng).unwrap();
/// assert_eq!(*pick, "a");
/// ```
pub fn sample<'a, T, R: Rng + ?Sized>(
    items: &'a [T],
    weights: Option<&[f64]>,
    rng: &mut R,
) -> Result<&'a T> {
    if items.is_empty() {
        return Err(CombinatoricsError::invalid("cannot sample from an empty list"));
    }
    let index = match weights {
        None => rng.random_range(0..items.len()),
        Some(w) if w.len() != items.len() => {
            return Err(CombinatoricsError::invalid(format!(
                "{} weights given for {} items",
                w.len(),
                items.len()
            )));
        }
        Some(w) => weighted_choose(w, rng)?,
    };
    Ok(&items[index])
}

/// Draws `count` elements of `items` with replacement, reusing one
/// precomputed cumulative table.
///
/// # Errors
/// Same as [`sample`].
pub fn sample_many<'a, T, R: Rng + ?Sized>(
    items: &'a [T],
    weights: &[f64],
    count: usize,
    rng: &mut R,
) -> Result<Vec<&'a T>> {
    if weights.len() != items.len() {
        return Err(CombinatoricsError::invalid(format!(
            "{} weights given for {} items",
            weights.len(),
            items.len()
        )));
    }
    let sampler = WeightedSampler::new(weights)?;
    Ok((0..count).map(|_| &items[sampler.sample(rng)]).collect())
}

// ============================================================================
// Tests
// ============================================================================
