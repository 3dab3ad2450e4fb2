//! Plain-text rendering of recommendations and dataset statistics.

use std::fmt::Write as _;

use serde::Serialize;

use crate::artifacts::{Artifacts, Movie};
use crate::engine::Recommendation;

/// Shown in place of an empty field
const EMPTY_FIELD: &str = "—";
const ELLIPSIS: char = '…';

/// Cut `value` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(value: &str, max: usize) -> String {
    let value = value.trim();
    if value.is_empty() {
        return EMPTY_FIELD.to_string();
    }
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max).collect();
    out.push(ELLIPSIS);
    out
}

/// Score in [0, 1] as a percentage with one decimal, e.g. `87.5%`.
pub fn format_score(score: f32) -> String {
    format!("{:.1}%", score * 100.0)
}

fn query_card(movie: &Movie) -> String {
    format!(
        "▸ {}\n  Director: {}\n  Cast:     {}\n  Genres:   {}\n",
        movie.title,
        truncate(&movie.director, 60),
        truncate(&movie.cast, 80),
        truncate(&movie.genres, 80),
    )
}

/// Render the query card followed by the ranked list.
///
/// `requested` is the count the user asked for; the list may be shorter.
pub fn format_recommendation(rec: &Recommendation, requested: usize) -> String {
    let mut out = query_card(&rec.query);
    let _ = writeln!(out, "\nTop {requested} Similar Movies\n");

    for result in &rec.results {
        let _ = writeln!(
            out,
            "{:02}  {}  ⚡ {}",
            result.rank,
            result.title,
            format_score(result.similarity_score)
        );
        let _ = writeln!(
            out,
            "    Dir: {} · Cast: {} · Genres: {}",
            truncate(&result.director, 40),
            truncate(&result.cast, 50),
            truncate(&result.genres, 40),
        );
    }

    out
}

/// Dataset summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub movies: usize,
    pub directors: usize,
    pub vocabulary: usize,
    pub non_zeros: usize,
}

impl Stats {
    pub fn of(artifacts: &Artifacts) -> Self {
        Self {
            movies: artifacts.table().len(),
            directors: artifacts.table().distinct_directors(),
            vocabulary: artifacts.matrix().cols(),
            non_zeros: artifacts.matrix().nnz(),
        }
    }
}

pub fn format_stats(stats: &Stats) -> String {
    format!(
        "Movies:      {}\nDirectors:   {}\nVocabulary:  {}\nNon-zeros:   {}\nAlgorithm:   TF-IDF + cosine similarity\n",
        stats.movies, stats.directors, stats.vocabulary, stats.non_zeros
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecommendationResult;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("a bit too long", 5), "a bit…");
        assert_eq!(truncate("   ", 5), "—");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("Amélie Poulain", 6), "Amélie…");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(1.0), "100.0%");
        assert_eq!(format_score(0.4567), "45.7%");
        assert_eq!(format_score(0.0), "0.0%");
    }

    #[test]
    fn test_format_recommendation() {
        let rec = Recommendation {
            query: Movie {
                title: "Alien".to_string(),
                cast: "Sigourney Weaver".to_string(),
                director: "Ridley Scott".to_string(),
                genres: "Horror".to_string(),
            },
            results: vec![RecommendationResult {
                rank: 1,
                title: "Aliens".to_string(),
                similarity_score: 0.5,
                cast: "Sigourney Weaver".to_string(),
                director: "James Cameron".to_string(),
                genres: String::new(),
            }],
        };

        let text = format_recommendation(&rec, 10);

        assert!(text.starts_with("▸ Alien\n"));
        assert!(text.contains("Director: Ridley Scott"));
        assert!(text.contains("Top 10 Similar Movies"));
        assert!(text.contains("01  Aliens  ⚡ 50.0%"));
        assert!(text.contains("Dir: James Cameron · Cast: Sigourney Weaver · Genres: —"));
    }

    #[test]
    fn test_format_stats() {
        let stats = Stats {
            movies: 4803,
            directors: 2349,
            vocabulary: 50000,
            non_zeros: 123456,
        };

        let text = format_stats(&stats);
        assert!(text.contains("Movies:      4803"));
        assert!(text.contains("Vocabulary:  50000"));
    }
}
