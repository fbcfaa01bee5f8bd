//! Empirical frequency tables and chi-squared goodness-of-fit.
//!
//! Sample a generator many times, tally the objects it returns, and compare
//! the tally against the distribution the generator claims to follow.
//!
//! # Examples
//! ```
//! use u_combinatorics::frequency::FrequencyTable;
//! use u_combinatorics::random::create_rng;
//! use u_combinatorics::random_dyck_word;
//!
//! let mut rng = create_rng(5);
//! let table = FrequencyTable::from_trials(5_000, || random_dyck_word(3, &mut rng));
//! let test = table.chi_squared_uniform(5).unwrap();
//! assert_eq!(test.degrees_of_freedom, 4);
//! assert!(test.p_value > 1e-4);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::error::{CombinatoricsError, Result};
use crate::special::chi_squared_sf;

/// Outcome of a chi-squared goodness-of-fit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquaredTest {
    /// Pearson statistic Σ (observed − expected)² / expected.
    pub statistic: f64,
    /// Number of categories minus one.
    pub degrees_of_freedom: usize,
    /// Probability of a statistic at least this large under the null.
    pub p_value: f64,
}

impl ChiSquaredTest {
    fn from_statistic(statistic: f64, degrees_of_freedom: usize) -> Self {
        Self {
            statistic,
            degrees_of_freedom,
            p_value: chi_squared_sf(statistic, degrees_of_freedom as f64),
        }
    }

    /// `true` if the null hypothesis survives at significance `alpha`.
    pub fn passes(&self, alpha: f64) -> bool {
        self.p_value >= alpha
    }
}

/// Tally of sampled objects.
#[derive(Debug, Clone)]
pub struct FrequencyTable<K> {
    counts: HashMap<K, u64>,
    total: u64,
}

impl<K: Eq + Hash> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> FrequencyTable<K> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            total: 0,
        }
    }

    /// Calls `generate` `trials` times and tallies the results.
    pub fn from_trials(trials: usize, mut generate: impl FnMut() -> K) -> Self {
        let mut table = Self::new();
        for _ in 0..trials {
            table.record(generate());
        }
        table
    }

    /// Adds one observation.
    pub fn record(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
        self.total += 1;
    }

    /// Number of times `key` was observed.
    pub fn count(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of observations.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct objects observed.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Empirical probability of `key`; `0.0` on an empty table.
    pub fn probability(&self, key: &K) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(key) as f64 / self.total as f64
    }

    /// Iterates over `(object, count)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(k, &c)| (k, c))
    }

    /// Largest `|p̂ − 1/categories|` over all `categories` outcomes,
    /// counting outcomes never observed as `p̂ = 0`.
    pub fn max_uniform_discrepancy(&self, categories: usize) -> f64 {
        if categories == 0 || self.total == 0 {
            return 0.0;
        }
        let uniform = 1.0 / categories as f64;
        let observed = self
            .counts
            .values()
            .map(|&c| (c as f64 / self.total as f64 - uniform).abs())
            .fold(0.0_f64, f64::max);
        if self.distinct() < categories {
            observed.max(uniform)
        } else {
            observed
        }
    }

    /// Chi-squared test against the uniform distribution over `categories`
    /// outcomes. Outcomes never observed count with observed = 0.
    ///
    /// # Errors
    /// `InvalidArgument` if the table is empty, `categories < 2`, or more
    /// distinct objects were observed than `categories` allows.
    pub fn chi_squared_uniform(&self, categories: usize) -> Result<ChiSquaredTest> {
        if self.total == 0 {
            return Err(CombinatoricsError::invalid("no observations recorded"));
        }
        if categories < 2 {
            return Err(CombinatoricsError::invalid(format!(
                "goodness-of-fit needs at least 2 categories, got {categories}"
            )));
        }
        if self.distinct() > categories {
            return Err(CombinatoricsError::invalid(format!(
                "{} distinct outcomes observed but only {categories} expected",
                self.distinct()
            )));
        }
        let expected = self.total as f64 / categories as f64;
        let unseen = (categories - self.distinct()) as f64;
        let statistic = self
            .counts
            .values()
            .map(|&c| {
                let d = c as f64 - expected;
                d * d / expected
            })
            .sum::<f64>()
            + unseen * expected;
        Ok(ChiSquaredTest::from_statistic(statistic, categories - 1))
    }

    /// Chi-squared test against an explicit distribution given as
    /// `(outcome, probability)` pairs.
    ///
    /// # Errors
    /// `InvalidArgument` if the table is empty, fewer than two outcomes are
    /// given, a probability is not positive, the probabilities do not sum to
    /// one, or an observed object has no expected probability.
    pub fn chi_squared(&self, expected: impl IntoIterator<Item = (K, f64)>) -> Result<ChiSquaredTest> {
        if self.total == 0 {
            return Err(CombinatoricsError::invalid("no observations recorded"));
        }
        let mut statistic = 0.0;
        let mut categories = 0usize;
        let mut covered = 0usize;
        let mut mass = 0.0;
        for (key, p) in expected {
            if !(p > 0.0 && p.is_finite()) {
                return Err(CombinatoricsError::invalid(format!(
                    "expected probability {p} is not positive"
                )));
            }
            let observed = self.count(&key);
            if observed > 0 {
                covered += 1;
            }
            let e = p * self.total as f64;
            let d = observed as f64 - e;
            statistic += d * d / e;
            mass += p;
            categories += 1;
        }
        if categories < 2 {
            return Err(CombinatoricsError::invalid(
                "goodness-of-fit needs at least 2 categories",
            ));
        }
        if (mass - 1.0).abs() > 1e-9 {
            return Err(CombinatoricsError::invalid(format!(
                "expected probabilities sum to {mass}, not 1"
            )));
        }
        if covered < self.distinct() {
            return Err(CombinatoricsError::invalid(format!(
                "{} observed outcomes have no expected probability",
                self.distinct() - covered
            )));
        }
        Ok(ChiSquaredTest::from_statistic(statistic, categories - 1))
    }
}

/// Renders the report as an `Object | Probability | Discrepancy` table,
/// sorted by object. Discrepancy is measured against `1 / distinct()`.
/// Objects whose `Display` spans several lines continue on the lines below.
impl<K: Eq + Hash + Ord + fmt::Display> fmt::Display for FrequencyTable<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<30} | {:<12} | {:<10}", "Object", "Probability", "Discrepancy")?;
        writeln!(f, "{}", "-".repeat(60))?;
        let mut keys: Vec<&K> = self.counts.keys().collect();
        keys.sort();
        let uniform = if self.distinct() == 0 {
            0.0
        } else {
            1.0 / self.distinct() as f64
        };
        for key in keys {
            let p = self.probability(key);
            let rendered = key.to_string();
            let mut lines = rendered.lines();
            let first = lines.next().unwrap_or("");
            writeln!(f, "{first:<30} | {p:<12.4} | {:<10.4}", (p - uniform).abs())?;
            for line in lines {
                writeln!(f, "{line:<30} | {:<12} |", "")?;
            }
            writeln!(f, "{}", "-".repeat(60))?;
        }
        write!(f, "Total observations: {}", self.total)
    }
}
