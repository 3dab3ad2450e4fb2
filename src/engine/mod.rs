//! Content-based recommendation over the loaded artifacts.
//!
//! Exact, exhaustive top-N retrieval: the query row is scored against every
//! row of the feature matrix with cosine similarity, then ranked.
//!
//! Ranking order is score descending, ties broken by lower row position. The
//! query's own row is dropped by position, so it never appears in the output
//! even when its self-similarity is not the highest score (an empty feature
//! vector scores 0 against everything, itself included).

mod similarity;

use serde::Serialize;

use crate::artifacts::{Artifacts, FeatureMatrix, ItemTable, Movie, TitleIndex};

pub use similarity::{cosine_similarity, score_rows};

/// Corpus size at which scoring moves onto the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 2048;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecommendError {
    #[error("movie not found in the dataset: {0:?}")]
    NotFound(String),
}

/// One ranked match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    /// 1-based display rank
    pub rank: usize,
    pub title: String,
    pub similarity_score: f32,
    pub cast: String,
    pub director: String,
    pub genres: String,
}

/// The movie that was matched against, plus its ranked neighbours.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub query: Movie,
    pub results: Vec<RecommendationResult>,
}

/// Top-`n` movies most similar to `title`, never including `title` itself.
///
/// Fewer than `n` results come back when the corpus is smaller than `n + 1`.
pub fn recommend(
    title: &str,
    table: &ItemTable,
    matrix: &FeatureMatrix,
    index: &TitleIndex,
    n: usize,
) -> Result<Recommendation, RecommendError> {
    recommend_with(title, table, matrix, index, n, DEFAULT_PARALLEL_THRESHOLD)
}

/// Same as [`recommend`], scoring in parallel once the matrix has at least
/// `parallel_threshold` rows.
pub fn recommend_with(
    title: &str,
    table: &ItemTable,
    matrix: &FeatureMatrix,
    index: &TitleIndex,
    n: usize,
    parallel_threshold: usize,
) -> Result<Recommendation, RecommendError> {
    let not_found = || RecommendError::NotFound(title.to_string());

    let position = index.get(title).ok_or_else(not_found)?;
    let query = table.get(position).cloned().ok_or_else(not_found)?;
    let query_row = matrix.row(position).ok_or_else(not_found)?;

    let parallel = matrix.rows() >= parallel_threshold;
    log::debug!(
        "scoring {} rows against row {position} ({})",
        matrix.rows(),
        if parallel { "parallel" } else { "sequential" }
    );

    let scores = score_rows(matrix, query_row, parallel);

    let results = top_n(&scores, position, n)
        .into_iter()
        .enumerate()
        .filter_map(|(i, (pos, score))| {
            table.get(pos).map(|movie| RecommendationResult {
                rank: i + 1,
                title: movie.title.clone(),
                similarity_score: score,
                cast: movie.cast.clone(),
                director: movie.director.clone(),
                genres: movie.genres.clone(),
            })
        })
        .collect();

    Ok(Recommendation { query, results })
}

impl Artifacts {
    pub fn recommend(&self, title: &str, n: usize) -> Result<Recommendation, RecommendError> {
        recommend(title, self.table(), self.matrix(), self.index(), n)
    }

    pub fn recommend_with(
        &self,
        title: &str,
        n: usize,
        parallel_threshold: usize,
    ) -> Result<Recommendation, RecommendError> {
        recommend_with(
            title,
            self.table(),
            self.matrix(),
            self.index(),
            n,
            parallel_threshold,
        )
    }
}

/// Best `n` `(position, score)` pairs, skipping `exclude`.
///
/// `(score desc, position asc)` is a total order, so selecting the first `n`
/// and sorting only those gives the same list as a stable sort of everything.
fn top_n(scores: &[f32], exclude: usize, n: usize) -> Vec<(usize, f32)> {
    if n == 0 {
        return vec![];
    }

    let order = |a: &(usize, f32), b: &(usize, f32)| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0));

    let mut ranked: Vec<(usize, f32)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(pos, _)| *pos != exclude)
        .collect();

    if n < ranked.len() {
        ranked.select_nth_unstable_by(n - 1, order);
        ranked.truncate(n);
    }
    ranked.sort_unstable_by(order);
    ranked
}
