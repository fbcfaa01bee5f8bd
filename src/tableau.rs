//! Standard Young tableaux.
//!
//! A standard Young tableau of shape `λ ⊢ n` fills the Young diagram of `λ`
//! with `1..=n` so that rows increase to the right and columns increase
//! downwards. Their number `f^λ` is given by the hook-length formula
//! `f^λ = n! / Π h(c)`.
//!
//! # Sampling
//!
//! - [`young_tableaux`]: uniform over the tableaux of one shape, via the
//!   Greene–Nijenhuis–Wilf hook walk. Placing `n` at a corner picked
//!   uniformly among corners is *not* uniform; the hook walk reaches each
//!   corner `c` with probability exactly `f^{λ∖c} / f^λ`.
//! - [`random_young_tableaux`]: uniform over all tableaux of size `n`, so
//!   shape `λ` appears with probability `f^λ / I(n)`. Drawn as the RSK
//!   image of a uniform involution.
//!
//! Reference: Greene, Nijenhuis & Wilf (1979), "A probabilistic proof of a
//! formula for the number of Young tableaux of a given shape", *Advances
//! in Mathematics* 31(1).

use std::fmt;

use num_bigint::BigUint;
use rand::Rng;

use crate::error::{CombinatoricsError, Result};
use crate::involution::{random_involution, rsk_insertion};
use crate::partition::Partition;

/// A standard Young tableau, stored row by row.
///
/// # Examples
/// ```
/// use u_combinatorics::YoungTableau;
/// let t = YoungTableau::from_rows(vec![vec![1, 2, 4], vec![3]]).unwrap();
/// assert_eq!(t.shape().parts(), &[3, 1]);
/// assert_eq!(t.to_string(), "1 2 4\n3");
/// assert!(YoungTableau::from_rows(vec![vec![2, 1]]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct YoungTableau {
    rows: Vec<Vec<usize>>,
}

impl YoungTableau {
    /// Validates that `rows` is a standard Young tableau.
    ///
    /// # Errors
    /// `InvalidArgument` if the row lengths are not a partition, the values
    /// are not exactly `1..=n`, or a row or column fails to increase.
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Result<Self> {
        check_standard(&rows)?;
        Ok(Self { rows })
    }

    pub(crate) fn from_valid_rows(rows: Vec<Vec<usize>>) -> Self {
        debug_assert!(check_standard(&rows).is_ok());
        Self { rows }
    }

    /// Rows and columns strictly increase and the values are `1..=n`.
    pub fn is_standard(&self) -> bool {
        check_standard(&self.rows).is_ok()
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    /// Row lengths.
    pub fn shape(&self) -> Partition {
        Partition::new(self.rows.iter().map(Vec::len).collect())
            .expect("tableau rows always form a partition")
    }

    /// Number of cells.
    pub fn size(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Value at `(row, column)`, if that cell exists.
    pub fn get(&self, row: usize, column: usize) -> Option<usize> {
        self.rows.get(row)?.get(column).copied()
    }

    /// Mirror along the main diagonal; still a standard tableau.
    pub fn transpose(&self) -> YoungTableau {
        let width = self.rows.first().map_or(0, Vec::len);
        let rows = (0..width)
            .map(|c| {
                self.rows
                    .iter()
                    .take_while(|row| row.len() > c)
                    .map(|row| row[c])
                    .collect()
            })
            .collect();
        YoungTableau { rows }
    }

    pub fn into_rows(self) -> Vec<Vec<usize>> {
        self.rows
    }
}

/// Rows on separate lines, values right-aligned to a common width.
impl fmt::Display for YoungTableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.size().to_string().len();
        for (r, row) in self.rows.iter().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for (c, v) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{v:>width$}")?;
            }
        }
        Ok(())
    }
}

fn check_standard(rows: &[Vec<usize>]) -> Result<()> {
    Partition::new(rows.iter().map(Vec::len).collect())?;
    let n: usize = rows.iter().map(Vec::len).sum();
    let mut seen = vec![false; n + 1];
    for (r, row) in rows.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            if v == 0 || v > n || std::mem::replace(&mut seen[v], true) {
                return Err(CombinatoricsError::invalid(format!(
                    "value {v} at ({r}, {c}) is out of 1..={n} or repeated"
                )));
            }
            if c > 0 && row[c - 1] >= v {
                return Err(CombinatoricsError::invalid(format!(
                    "row {r} does not increase at column {c}"
                )));
            }
            if r > 0 && rows[r - 1][c] >= v {
                return Err(CombinatoricsError::invalid(format!(
                    "column {c} does not increase at row {r}"
                )));
            }
        }
    }
    Ok(())
}

fn checked_shape(shape: &[usize], sort: bool) -> Result<Partition> {
    if sort {
        Partition::from_unsorted(shape.to_vec())
    } else {
        Partition::new(shape.to_vec())
    }
}

/// Hook length of every cell: cells to the right, cells below, plus one.
///
/// # Errors
/// `InvalidArgument` if `shape` is not a partition.
pub fn hook_lengths(shape: &[usize]) -> Result<Vec<Vec<usize>>> {
    let shape = checked_shape(shape, false)?;
    let columns = shape.conjugate();
    Ok(shape
        .iter()
        .enumerate()
        .map(|(r, &len)| (0..len).map(|c| (len - c - 1) + (columns[c] - r - 1) + 1).collect())
        .collect())
}

/// Number of standard Young tableaux of `shape`, by the hook-length formula.
///
/// # Errors
/// `InvalidArgument` if `shape` is not a partition.
///
/// # Examples
/// ```
/// use num_bigint::BigUint;
/// use u_combinatorics::number_standard_tableaux;
/// assert_eq!(number_standard_tableaux(&[3, 2]).unwrap(), BigUint::from(5u32));
/// assert_eq!(number_standard_tableaux(&[]).unwrap(), BigUint::from(1u32));
/// ```
pub fn number_standard_tableaux(shape: &[usize]) -> Result<BigUint> {
    let hooks = hook_lengths(shape)?;
    let n: usize = shape.iter().sum();
    let factorial: BigUint = (1..=n).map(BigUint::from).product();
    let product: BigUint = hooks.iter().flatten().map(|&h| BigUint::from(h)).product();
    Ok(factorial / product)
}

/// Uniformly random standard Young tableau of the given shape.
///
/// With `sort`, the row lengths are first put in descending order; without
/// it they must already be non-increasing.
///
/// # Errors
/// `InvalidArgument` if a row length is zero, or if `sort` is `false` and
/// the row lengths increase somewhere.
///
/// # Complexity
/// Expected O(n · (rows + columns)) for the hook walks.
///
/// # Examples
/// ```
/// use u_combinatorics::random::create_rng;
/// use u_combinatorics::young_tableaux;
/// let mut rng = create_rng(8);
/// let t = young_tableaux(&[1, 3, 2], true, &mut rng).unwrap();
/// assert_eq!(t.shape().parts(), &[3, 2, 1]);
/// assert!(young_tableaux(&[1, 3, 2], false, &mut rng).is_err());
/// ```
pub fn young_tableaux<R: Rng + ?Sized>(shape: &[usize], sort: bool, rng: &mut R) -> Result<YoungTableau> {
    let shape = checked_shape(shape, sort)?;
    let mut remaining_row: Vec<usize> = shape.to_vec();
    let mut rows: Vec<Vec<usize>> = shape.iter().map(|&len| vec![0; len]).collect();
    let n = shape.sum();
    for value in (1..=n).rev() {
        let (mut r, mut c) = uniform_cell(&remaining_row, value, rng);
        loop {
            let arm = remaining_row[r] - c - 1;
            let leg = remaining_row[r + 1..].iter().take_while(|&&len| len > c).count();
            if arm + leg == 0 {
                break;
            }
            let j = rng.random_range(0..arm + leg);
            if j < arm {
                c += 1 + j;
            } else {
                r += 1 + (j - arm);
            }
        }
        rows[r][c] = value;
        remaining_row[r] -= 1;
    }
    Ok(YoungTableau::from_valid_rows(rows))
}

/// Uniform cell of a diagram with `cells` cells and the given row lengths.
fn uniform_cell<R: Rng + ?Sized>(row_lengths: &[usize], cells: usize, rng: &mut R) -> (usize, usize) {
    let mut index = rng.random_range(0..cells);
    for (r, &len) in row_lengths.iter().enumerate() {
        if index < len {
            return (r, index);
        }
        index -= len;
    }
    unreachable!("cell index below the diagram size always lands in a row")
}

/// Uniformly random standard Young tableau of size `n`, over all shapes.
///
/// Each shape `λ` appears with probability `f^λ / I(n)`, where `I(n)` is the
/// number of involutions of `n` (equal to the total number of tableaux).
///
/// # Complexity
/// O(n) for the involution, O(n²) worst case for the RSK insertion.
///
/// # Examples
/// ```
/// use u_combinatorics::random::create_rng;
/// use u_combinatorics::{random_young_tableaux, YoungTableau};
/// let mut rng = create_rng(17);
/// let t = random_young_tableaux(12, &mut rng);
/// assert_eq!(t.size(), 12);
/// assert!(YoungTableau::from_rows(t.clone().into_rows()).is_ok());
/// ```
pub fn random_young_tableaux<R: Rng + ?Sized>(n: usize, rng: &mut R) -> YoungTableau {
    rsk_insertion(&random_involution(n, rng)).expect("an involution is a permutation")
}

/// Every partition of `n`, largest parts first.
#[cfg(test)]
pub(crate) fn all_shapes(n: usize) -> Vec<Partition> {
    fn go(rest: usize, bound: usize, prefix: &mut Vec<usize>, out: &mut Vec<Partition>) {
        if rest == 0 {
            out.push(Partition::new(prefix.clone()).unwrap());
            return;
        }
        for part in (1..=bound.min(rest)).rev() {
            prefix.push(part);
            go(rest - part, part, prefix, out);
            prefix.pop();
        }
    }
    let mut out = Vec::new();
    go(n, n, &mut Vec::new(), &mut out);
    out
}
