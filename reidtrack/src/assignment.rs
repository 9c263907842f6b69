/// Threshold-bounded greedy assignment between existing entities and new observations
///
/// Rows of every cost matrix are existing entities (tracklets, sessions), columns
/// are new observations (boxes, vectors). Both the proximity tracker and the
/// identity resolver go through this module.
use crate::error::Result;
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

/// One accepted (entity, observation) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub row: usize,
    pub col: usize,
    pub cost: f32,
}

/// Result of a greedy assignment pass
#[derive(Debug, Clone, Default)]
pub struct AssignmentResult {
    /// Accepted pairs, in the order they were accepted (ascending cost)
    pub matches: Vec<Match>,
    /// Indices of rows left without a partner
    pub unmatched_rows: Vec<usize>,
    /// Indices of columns left without a partner
    pub unmatched_cols: Vec<usize>,
    /// Sum of accepted costs
    pub total_cost: f32,
}

impl AssignmentResult {
    /// Column assigned to each row, if any
    pub fn row_assignments(&self, num_rows: usize) -> Vec<Option<usize>> {
        let mut assignment_vector = vec![None; num_rows];
        for m in &self.matches {
            assignment_vector[m.row] = Some(m.col);
        }
        assignment_vector
    }

    /// Row assigned to each column, if any
    pub fn col_assignments(&self, num_cols: usize) -> Vec<Option<usize>> {
        let mut assignment_vector = vec![None; num_cols];
        for m in &self.matches {
            assignment_vector[m.col] = Some(m.row);
        }
        assignment_vector
    }
}

/// Greedy distance-sorted one-to-one matcher
pub struct GreedyMatcher;

impl GreedyMatcher {
    /// Match every pair whose cost is strictly below `threshold`
    pub fn solve(cost_matrix: ArrayView2<f32>, threshold: f32) -> AssignmentResult {
        Self::solve_by(cost_matrix, |_, _, cost| cost < threshold)
    }

    /// Match using a per-pair admission test.
    ///
    /// All admitted pairs are collected in row-major order, stably sorted by
    /// ascending cost, then accepted one by one unless their row or column was
    /// already taken. Equal costs therefore resolve in row-major order.
    pub fn solve_by<F>(cost_matrix: ArrayView2<f32>, admit: F) -> AssignmentResult
    where
        F: Fn(usize, usize, f32) -> bool,
    {
        let num_rows = cost_matrix.nrows();
        let num_cols = cost_matrix.ncols();

        // Collect all valid assignments with their costs
        let mut candidates: Vec<Match> = Vec::new();
        for ((row, col), &cost) in cost_matrix.indexed_iter() {
            if !cost.is_nan() && admit(row, col, cost) {
                candidates.push(Match { row, col, cost });
            }
        }

        candidates.sort_by(|a, b| a.cost.total_cmp(&b.cost));

        let mut matches = Vec::new();
        let mut used_rows = vec![false; num_rows];
        let mut used_cols = vec![false; num_cols];

        for candidate in candidates {
            if !used_rows[candidate.row] && !used_cols[candidate.col] {
                used_rows[candidate.row] = true;
                used_cols[candidate.col] = true;
                log::trace!(
                    "accepted pair row={} col={} cost={:.4}",
                    candidate.row,
                    candidate.col,
                    candidate.cost
                );
                matches.push(candidate);
            }
        }

        let unmatched_rows: Vec<usize> = (0..num_rows).filter(|&i| !used_rows[i]).collect();
        let unmatched_cols: Vec<usize> = (0..num_cols).filter(|&j| !used_cols[j]).collect();
        let total_cost = matches.iter().map(|m| m.cost).sum();

        AssignmentResult {
            matches,
            unmatched_rows,
            unmatched_cols,
            total_cost,
        }
    }
}

/// Compute a `(rows.len(), cols.len())` cost matrix in parallel
pub fn cost_matrix<R, C, F>(rows: &[R], cols: &[C], cost: F) -> Array2<f32>
where
    R: Sync,
    C: Sync,
    F: Fn(&R, &C) -> f32 + Sync,
{
    let n_rows = rows.len();
    let n_cols = cols.len();

    if n_rows == 0 || n_cols == 0 {
        return Array2::zeros((n_rows, n_cols));
    }

    let data: Vec<f32> = rows
        .par_iter()
        .flat_map_iter(|r| cols.iter().map(|c| cost(r, c)).collect::<Vec<_>>())
        .collect();

    Array2::from_shape_vec((n_rows, n_cols), data).unwrap_or_else(|_| Array2::zeros((n_rows, n_cols)))
}

/// Fallible variant of [`cost_matrix`]; the first error aborts the whole matrix
pub fn try_cost_matrix<R, C, F>(rows: &[R], cols: &[C], cost: F) -> Result<Array2<f32>>
where
    R: Sync,
    C: Sync,
    F: Fn(&R, &C) -> Result<f32> + Sync,
{
    let n_rows = rows.len();
    let n_cols = cols.len();

    if n_rows == 0 || n_cols == 0 {
        return Ok(Array2::zeros((n_rows, n_cols)));
    }

    let data: Vec<f32> = rows
        .par_iter()
        .map(|r| cols.iter().map(|c| cost(r, c)).collect::<Result<Vec<f32>>>())
        .collect::<Result<Vec<Vec<f32>>>>()?
        .into_iter()
        .flatten()
        .collect();

    Ok(Array2::from_shape_vec((n_rows, n_cols), data)
        .unwrap_or_else(|_| Array2::zeros((n_rows, n_cols))))
}
