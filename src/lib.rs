//! # u-combinatorics
//!
//! Exact uniform samplers and counters for classical combinatorial objects.
//!
//! Every sampler draws from the exact distribution: counts are kept as
//! arbitrary-precision integers and choices between branches are weighted
//! by exact completion counts, so no floating-point rounding biases the
//! result however large the object.
//!
//! ## Modules
//!
//! - [`partition`]: integer partitions, bounded and with a fixed number of
//!   parts, and ordered partitions (compositions)
//! - [`dyck`]: Dyck words (balanced Up/Down paths)
//! - [`tree`]: binary trees via the Dyck word bijection
//! - [`tableau`]: standard Young tableaux of a fixed shape or of any shape
//! - [`involution`]: involutions and Robinson–Schensted insertion
//! - [`completion`]: the generic "walk weighted by completion counts" step
//! - [`weighted`]: weighted choice over `f64` and `BigUint` weights
//! - [`random`]: seeded streams, the default stream, permutations, subsets
//! - [`cache`]: process-wide counting-table cache
//! - [`frequency`]: empirical frequency tables and chi-squared tests
//! - [`special`]: incomplete gamma and chi-squared distribution functions
//!
//! ## Design Philosophy
//!
//! - **Exactness first**: `BigUint` counts, rejection-sampled uniform
//!   integers, never float weights on counts
//! - **Explicit randomness**: every sampler takes `rng: &mut R`; the default
//!   stream is opt-in via [`with_default_rng`]
//! - **Property-based testing**: invariants verified via proptest, uniformity
//!   via chi-squared tests
//!
//! ```
//! use u_combinatorics::{random_partition, random_binary_tree, create_rng};
//! let mut rng = create_rng(42);
//! let p = random_partition(20, 20, &mut rng).unwrap();
//! assert_eq!(p.sum(), 20);
//! assert_eq!(random_binary_tree(6, &mut rng).node_count(), 6);
//! ```

pub mod cache;
pub mod completion;
pub mod dyck;
pub mod error;
pub mod frequency;
pub mod involution;
pub mod partition;
pub mod random;
pub mod special;
pub mod tableau;
pub mod tree;
pub mod weighted;

pub use dyck::{number_dyck_words, random_dyck_word, DyckTable, DyckWord, Step};
pub use error::{CombinatoricsError, Result};
pub use frequency::{ChiSquaredTest, FrequencyTable};
pub use involution::{number_involutions, random_involution, rsk_insertion};
pub use partition::{
    number_partitions, random_composition_with_parts, random_ordered_partition,
    random_partition, random_partition_with_parts, Partition, PartitionTable,
};
pub use random::{
    create_rng, random_combination, random_permutation, random_subset, reset_default_rng,
    sample, sample_many, seed_default_rng, shuffle, with_default_rng, RandomSource,
};
pub use tableau::{
    hook_lengths, number_standard_tableaux, random_young_tableaux, young_tableaux,
    YoungTableau,
};
pub use tree::{dyck_word_to_tree, random_binary_tree, BinaryTree, NodeId};
pub use weighted::{uniform_below, weighted_choose, weighted_choose_exact, WeightedSampler};
