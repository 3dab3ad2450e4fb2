//! Cosine similarity over sparse rows.

use rayon::prelude::*;

use crate::artifacts::{FeatureMatrix, SparseRow};

/// Cosine similarity of two sparse rows.
///
/// Zero when either row has zero magnitude, so an empty feature vector never
/// produces NaN. Computed in `f64` and clamped to `[0, 1]`, the range for
/// non-negative weights.
pub fn cosine_similarity(a: SparseRow<'_>, b: SparseRow<'_>) -> f32 {
    if a.norm == 0.0 || b.norm == 0.0 {
        return 0.0;
    }
    let score = dot_product(a, b) / a.norm / b.norm;
    score.clamp(0.0, 1.0) as f32
}

/// Dot product by merging the two sorted index lists.
fn dot_product(a: SparseRow<'_>, b: SparseRow<'_>) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0f64;

    while i < a.indices.len() && j < b.indices.len() {
        match a.indices[i].cmp(&b.indices[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += f64::from(a.values[i]) * f64::from(b.values[j]);
                i += 1;
                j += 1;
            }
        }
    }

    sum
}

/// Score `query` against every row of `matrix`, in row order.
///
/// Rows are scored on the rayon pool when `parallel` is set; the output is
/// the same either way.
pub fn score_rows(matrix: &FeatureMatrix, query: SparseRow<'_>, parallel: bool) -> Vec<f32> {
    let score = |row: usize| {
        matrix
            .row(row)
            .map_or(0.0, |target| cosine_similarity(query, target))
    };

    if parallel {
        (0..matrix.rows()).into_par_iter().map(score).collect()
    } else {
        (0..matrix.rows()).map(score).collect()
    }
}
