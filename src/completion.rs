//! Sequential sampling over a completion-count table.
//!
//! Every exact sampler in the crate has the same shape: a state machine
//! whose states carry the number of ways to finish from them, and a walk
//! that picks each transition with probability proportional to the number
//! of completions through it. Because the product of those conditional
//! probabilities telescopes to `1 / count(start)`, every complete object is
//! produced with the same probability.
//!
//! Implementors describe the two outgoing transitions of a state with
//! [`Branch`]es; [`walk`] does the rest.

use num_bigint::BigUint;
use num_traits::Zero;
use rand::Rng;

use crate::error::{CombinatoricsError, Result};
use crate::weighted::weighted_choose_refs;

/// One outgoing transition of a state.
#[derive(Debug, Clone)]
pub struct Branch<'a, S, T> {
    /// Item appended to the output when this transition is taken.
    pub emit: Option<T>,
    /// State reached by the transition.
    pub next: S,
    /// Number of complete objects reachable through this transition.
    pub weight: &'a BigUint,
}

/// A table of completion counts with binary branching.
pub trait CompletionCounts {
    type State: Copy + std::fmt::Debug;
    type Item;

    /// Number of completions from `state`.
    fn completions(&self, state: Self::State) -> &BigUint;

    /// `true` once `state` denotes a finished object.
    fn is_complete(&self, state: Self::State) -> bool;

    /// The two transitions out of a non-complete `state`. A transition that
    /// is not allowed must carry a zero weight.
    fn branches(&self, state: Self::State) -> [Branch<'_, Self::State, Self::Item>; 2];
}

/// Walks `counts` from `start`, choosing each branch with probability
/// proportional to its weight, and returns the emitted items in order.
///
/// # Errors
/// `InvalidArgument` if `start` has no completion.
///
/// # Complexity
/// One exact weighted choice per transition.
pub fn walk<C, R>(counts: &C, start: C::State, rng: &mut R) -> Result<Vec<C::Item>>
where
    C: CompletionCounts + ?Sized,
    R: Rng + ?Sized,
{
    if counts.completions(start).is_zero() {
        return Err(CombinatoricsError::invalid(format!(
            "no object can be completed from {start:?}"
        )));
    }
    let mut state = start;
    let mut out = Vec::new();
    while !counts.is_complete(state) {
        let [first, second] = counts.branches(state);
        let chosen = match weighted_choose_refs([first.weight, second.weight], rng)? {
            0 => first,
            _ => second,
        };
        if let Some(item) = chosen.emit {
            out.push(item);
        }
        state = chosen.next;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use std::collections::HashMap;

    /// Binary strings of a fixed length with no two adjacent ones,
    /// counted by Fibonacci numbers. State: (remaining, last bit was one).
    struct NoAdjacentOnes {
        // counts[r][last] = completions with r bits left
        counts: Vec<[BigUint; 2]>,
        zero: BigUint,
    }

    impl NoAdjacentOnes {
        fn new(len: usize) -> Self {
            let mut counts = vec![[BigUint::from(1u8), BigUint::from(1u8)]];
            for r in 1..=len {
                let prev = &counts[r - 1];
                let after_zero = &prev[0] + &prev[1];
                let after_one = prev[0].clone();
                counts.push([after_zero, after_one]);
            }
            Self { counts, zero: BigUint::zero() }
        }
    }

    impl CompletionCounts for NoAdjacentOnes {
        type State = (usize, usize);
        type Item = u8;

        fn completions(&self, (r, last): Self::State) -> &BigUint {
            &self.counts[r][last]
        }

        fn is_complete(&self, (r, _): Self::State) -> bool {
            r == 0
        }

        fn branches(&self, (r, last): Self::State) -> [Branch<'_, Self::State, u8>; 2] {
            let zero = Branch { emit: Some(0), next: (r - 1, 0), weight: &self.counts[r - 1][0] };
            let one_weight = if last == 1 { &self.zero } else { &self.counts[r - 1][1] };
            let one = Branch { emit: Some(1), next: (r - 1, 1), weight: one_weight };
            [zero, one]
        }
    }

    #[test]
    fn test_walk_produces_valid_strings() {
        let table = NoAdjacentOnes::new(10);
        let mut rng = create_rng(1);
        for _ in 0..200 {
            let s = walk(&table, (10, 0), &mut rng).unwrap();
            assert_eq!(s.len(), 10);
            assert!(s.windows(2).all(|w| !(w[0] == 1 && w[1] == 1)));
        }
    }

    #[test]
    fn test_walk_is_uniform() {
        // 4 bits with no adjacent ones: F(6) = 8 strings.
        let table = NoAdjacentOnes::new(4);
        assert_eq!(table.completions((4, 0)), &BigUint::from(8u8));
        let mut rng = create_rng(77);
        let mut counts: HashMap<Vec<u8>, u32> = HashMap::new();
        let trials = 16_000;
        for _ in 0..trials {
            *counts.entry(walk(&table, (4, 0), &mut rng).unwrap()).or_default() += 1;
        }
        assert_eq!(counts.len(), 8);
        for (s, &c) in &counts {
            let p = c as f64 / trials as f64;
            assert!((p - 0.125).abs() < 0.015, "{s:?} has frequency {p}");
        }
    }

    #[test]
    fn test_walk_from_complete_state_is_empty() {
        let table = NoAdjacentOnes::new(3);
        let mut rng = create_rng(0);
        assert!(walk(&table, (0, 1), &mut rng).unwrap().is_empty());
    }
}
