//! Binary trees and their bijection with Dyck words.
//!
//! A Dyck word decomposes uniquely at its first return to zero as
//! `U A D B` with `A` and `B` Dyck words; mapping that to a node with left
//! subtree `A` and right subtree `B` is a bijection between Dyck words of
//! semilength `n` and binary trees with `n` nodes. Composed with
//! [`random_dyck_word`], it samples binary trees uniformly.
//!
//! Trees live in an arena: nodes are stored in preorder and refer to their
//! children by index, each node has exactly one parent, and the root is
//! node 0. Because the layout is canonical, two trees are equal exactly when
//! their shapes are.

use std::fmt;

use rand::Rng;

use crate::dyck::{random_dyck_word, validate_steps, DyckWord, Step};
use crate::error::Result;

/// Index of a node inside its [`BinaryTree`].
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct Node {
    left: Option<NodeId>,
    right: Option<NodeId>,
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// A rooted binary tree shape.
///
/// # Examples
/// ```
/// use u_combinatorics::{dyck_word_to_tree, DyckWord};
/// let word: DyckWord = "UUDDUD".parse().unwrap();
/// let tree = dyck_word_to_tree(&word).unwrap();
/// assert_eq!(tree.node_count(), 3);
/// assert_eq!(tree.to_dyck_word(), word);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BinaryTree {
    nodes: Vec<Node>,
}

impl BinaryTree {
    /// The empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of (internal) nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// Left child of `node`.
    ///
    /// # Panics
    /// Panics if `node` is not a node of this tree.
    pub fn left(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].left
    }

    /// Right child of `node`.
    ///
    /// # Panics
    /// Panics if `node` is not a node of this tree.
    pub fn right(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].right
    }

    /// Number of nodes on the longest root-to-leaf path; 0 when empty.
    pub fn height(&self) -> usize {
        let mut best = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root().map(|r| (r, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            best = best.max(depth);
            let node = self.nodes[id];
            stack.extend(node.left.map(|c| (c, depth + 1)));
            stack.extend(node.right.map(|c| (c, depth + 1)));
        }
        best
    }

    /// Builds the tree of a step sequence already known to be a Dyck word.
    ///
    /// Up opens a node in the current slot and moves to its left slot; Down
    /// closes the innermost open node and moves to its right slot.
    fn from_valid_steps(steps: &[Step]) -> Self {
        let mut nodes: Vec<Node> = Vec::with_capacity(steps.len() / 2);
        let mut open: Vec<NodeId> = Vec::new();
        let mut slot: Option<(NodeId, Side)> = None;
        for step in steps {
            match step {
                Step::Up => {
                    let id = nodes.len();
                    nodes.push(Node::default());
                    match slot {
                        Some((parent, Side::Left)) => nodes[parent].left = Some(id),
                        Some((parent, Side::Right)) => nodes[parent].right = Some(id),
                        None => {}
                    }
                    open.push(id);
                    slot = Some((id, Side::Left));
                }
                Step::Down => {
                    if let Some(id) = open.pop() {
                        slot = Some((id, Side::Right));
                    }
                }
            }
        }
        Self { nodes }
    }

    /// Inverse of [`dyck_word_to_tree`]: preorder, emitting Up on entering a
    /// node and Down between its left and right subtrees.
    pub fn to_dyck_word(&self) -> DyckWord {
        enum Task {
            Visit(NodeId),
            Close,
        }
        let mut steps = Vec::with_capacity(2 * self.nodes.len());
        let mut stack: Vec<Task> = self.root().map(Task::Visit).into_iter().collect();
        while let Some(task) = stack.pop() {
            match task {
                Task::Visit(id) => {
                    steps.push(Step::Up);
                    let node = self.nodes[id];
                    stack.extend(node.right.map(Task::Visit));
                    stack.push(Task::Close);
                    stack.extend(node.left.map(Task::Visit));
                }
                Task::Close => steps.push(Step::Down),
            }
        }
        DyckWord::from_valid(steps)
    }
}

impl From<&DyckWord> for BinaryTree {
    fn from(word: &DyckWord) -> Self {
        Self::from_valid_steps(word.steps())
    }
}

/// Indented outline, left child before right:
///
/// ```text
/// Root: X
///     L--- X
///     R--- X
/// ```
impl fmt::Display for BinaryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.root() else {
            return write!(f, "(empty)");
        };
        let mut stack = vec![(root, 0usize, "Root: ")];
        let mut first = true;
        while let Some((id, level, prefix)) = stack.pop() {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{}{prefix}X", "    ".repeat(level))?;
            let node = self.nodes[id];
            stack.extend(node.right.map(|c| (c, level + 1, "R--- ")));
            stack.extend(node.left.map(|c| (c, level + 1, "L--- ")));
        }
        Ok(())
    }
}

/// Converts a Dyck word into its binary tree.
///
/// # Errors
/// `InvalidArgument` if `steps` is not a Dyck word.
///
/// # Complexity
/// O(n)
pub fn dyck_word_to_tree(steps: &[Step]) -> Result<BinaryTree> {
    validate_steps(steps)?;
    Ok(BinaryTree::from_valid_steps(steps))
}

/// Uniformly random binary tree with `n` nodes.
///
/// # Examples
/// ```
/// use u_combinatorics::random::create_rng;
/// use u_combinatorics::random_binary_tree;
/// let mut rng = create_rng(2);
/// assert_eq!(random_binary_tree(4, &mut rng).node_count(), 4);
/// ```
pub fn random_binary_tree<R: Rng + ?Sized>(n: usize, rng: &mut R) -> BinaryTree {
    BinaryTree::from(&random_dyck_word(n, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dyck::number_dyck_words;
    use crate::error::CombinatoricsError;
    use crate::frequency::FrequencyTable;
    use crate::random::create_rng;
    use num_traits::ToPrimitive;
    use std::collections::HashSet;

    fn all_words(n: usize) -> Vec<DyckWord> {
        fn go(ups: usize, downs: usize, n: usize, prefix: &mut Vec<Step>, out: &mut Vec<DyckWord>) {
            if ups == n && downs == n {
                out.push(DyckWord::new(prefix.clone()).unwrap());
                return;
            }
            if ups < n {
                prefix.push(Step::Up);
                go(ups + 1, downs, n, prefix, out);
                prefix.pop();
            }
            if downs < ups {
                prefix.push(Step::Down);
                go(ups, downs + 1, n, prefix, out);
                prefix.pop();
            }
        }
        let mut out = Vec::new();
        go(0, 0, n, &mut Vec::new(), &mut out);
        out
    }

    #[test]
    fn test_bijection_small_sizes() {
        for n in 0..=7 {
            let words = all_words(n);
            let trees: HashSet<BinaryTree> = words
                .iter()
                .map(|w| {
                    let t = dyck_word_to_tree(w).unwrap();
                    assert_eq!(t.node_count(), n);
                    assert_eq!(&t.to_dyck_word(), w);
                    t
                })
                .collect();
            assert_eq!(trees.len(), words.len(), "distinct words must give distinct trees");
            assert_eq!(Some(trees.len()), number_dyck_words(n).to_usize());
        }
    }

    #[test]
    fn test_first_return_decomposition() {
        // U (UD) D (UD): root with a single left child and a single right child
        let t = dyck_word_to_tree(&"UUDDUD".parse::<DyckWord>().unwrap()).unwrap();
        let root = t.root().unwrap();
        let left = t.left(root).unwrap();
        let right = t.right(root).unwrap();
        assert_eq!((t.left(left), t.right(left)), (None, None));
        assert_eq!((t.left(right), t.right(right)), (None, None));
        assert_eq!(t.height(), 2);

        // UDUDUD: a right spine
        let spine = dyck_word_to_tree(&"UDUDUD".parse::<DyckWord>().unwrap()).unwrap();
        assert_eq!(spine.height(), 3);
        assert_eq!(spine.left(0), None);
    }

    #[test]
    fn test_rejects_malformed_words() {
        use Step::{Down, Up};
        for bad in [vec![Up], vec![Down, Up], vec![Up, Up, Down], vec![Up, Down, Down, Up]] {
            assert!(matches!(
                dyck_word_to_tree(&bad),
                Err(CombinatoricsError::InvalidArgument(_))
            ));
        }
        assert!(dyck_word_to_tree(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_random_binary_tree_node_count() {
        let mut rng = create_rng(44);
        for _ in 0..100 {
            assert_eq!(random_binary_tree(4, &mut rng).node_count(), 4);
        }
        let big = random_binary_tree(300, &mut rng);
        assert_eq!(big.node_count(), 300);
        assert_eq!(big.to_dyck_word().semilength(), 300);
    }

    #[test]
    fn test_random_binary_tree_is_uniform() {
        let mut rng = create_rng(90);
        let table = FrequencyTable::from_trials(14 * 400, || random_binary_tree(4, &mut rng));
        assert_eq!(table.distinct(), 14);
        let test = table.chi_squared_uniform(14).unwrap();
        assert!(test.passes(1e-4), "chi-squared p = {}", test.p_value);
    }

    #[test]
    fn test_display_outline() {
        let t = BinaryTree::from(&"UUDDUD".parse::<DyckWord>().unwrap());
        assert_eq!(t.to_string(), "Root: X\n    L--- X\n    R--- X");
        assert_eq!(BinaryTree::empty().to_string(), "(empty)");
    }
}
