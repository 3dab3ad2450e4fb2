//! Precomputed artifacts consumed by the recommendation engine.
//!
//! # Architecture
//!
//! - `movies`: Item table (CSV), one record per matrix row
//! - `matrix`: Sparse feature matrix with a checksummed binary encoding
//! - `titles`: Title -> row position lookup (JSON)
//! - `store`: Load-once, process-wide cache of the three artifacts

mod matrix;
mod movies;
mod store;
mod titles;

use std::fmt;

pub use matrix::{FeatureMatrix, MatrixError, SparseRow};
pub use movies::{ItemTable, Movie};
pub use store::{ArtifactFiles, ArtifactStore};
pub use titles::TitleIndex;

/// Which of the three artifacts an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    ItemTable,
    FeatureMatrix,
    TitleIndex,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::ItemTable => "item table",
            ArtifactKind::FeatureMatrix => "feature matrix",
            ArtifactKind::TitleIndex => "title index",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// The artifact could not be read or decoded.
    #[error("missing {artifact} `{file}`: {reason}")]
    Missing {
        artifact: ArtifactKind,
        file: String,
        reason: String,
    },

    #[error("item table has {table_rows} rows but feature matrix has {matrix_rows}")]
    Misaligned {
        table_rows: usize,
        matrix_rows: usize,
    },

    #[error("title index maps {title:?} to row {position}, but there are only {rows} rows")]
    DanglingIndex {
        title: String,
        position: usize,
        rows: usize,
    },
}

/// The item table, feature matrix and title index, checked to be aligned.
///
/// Row `i` of the table is row `i` of the matrix, and every index entry
/// points at an existing row. Nothing mutates an `Artifacts` once built.
#[derive(Debug, Clone)]
pub struct Artifacts {
    table: ItemTable,
    matrix: FeatureMatrix,
    index: TitleIndex,
}

impl Artifacts {
    pub fn new(
        table: ItemTable,
        matrix: FeatureMatrix,
        index: TitleIndex,
    ) -> Result<Self, ArtifactError> {
        if table.len() != matrix.rows() {
            return Err(ArtifactError::Misaligned {
                table_rows: table.len(),
                matrix_rows: matrix.rows(),
            });
        }

        if let Some((title, position)) = index.iter().find(|(_, pos)| *pos >= table.len()) {
            return Err(ArtifactError::DanglingIndex {
                title: title.to_string(),
                position,
                rows: table.len(),
            });
        }

        let unindexed = table
            .iter()
            .filter(|m| index.get(&m.title).is_none())
            .count();
        if unindexed > 0 {
            log::warn!("{unindexed} movies have no title index entry and cannot be queried");
        }

        Ok(Self {
            table,
            matrix,
            index,
        })
    }

    pub fn table(&self) -> &ItemTable {
        &self.table
    }

    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    pub fn index(&self) -> &TitleIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(titles: &[&str]) -> ItemTable {
        ItemTable::new(
            titles
                .iter()
                .map(|t| Movie {
                    title: t.to_string(),
                    ..Default::default()
                })
                .collect(),
        )
    }

    fn matrix(rows: usize) -> FeatureMatrix {
        FeatureMatrix::from_dense(1, vec![vec![1.0]; rows]).unwrap()
    }

    #[test]
    fn test_new_accepts_aligned() {
        let table = table(&["A", "B"]);
        let index = TitleIndex::from_table(&table);

        let artifacts = Artifacts::new(table, matrix(2), index).unwrap();
        assert_eq!(artifacts.table().len(), 2);
        assert_eq!(artifacts.matrix().rows(), 2);
        assert_eq!(artifacts.index().get("B"), Some(1));
    }

    #[test]
    fn test_new_rejects_row_mismatch() {
        let table = table(&["A", "B", "C"]);
        let index = TitleIndex::from_table(&table);

        let result = Artifacts::new(table, matrix(2), index);
        assert!(matches!(
            result,
            Err(ArtifactError::Misaligned {
                table_rows: 3,
                matrix_rows: 2
            })
        ));
    }

    #[test]
    fn test_new_rejects_dangling_index() {
        let table = table(&["A"]);
        let mut index = TitleIndex::from_table(&table);
        index.insert("Ghost", 7);

        let result = Artifacts::new(table, matrix(1), index);
        match result {
            Err(ArtifactError::DanglingIndex {
                title,
                position,
                rows,
            }) => {
                assert_eq!(title, "Ghost");
                assert_eq!(position, 7);
                assert_eq!(rows, 1);
            }
            other => panic!("expected DanglingIndex, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_error_names_artifact_and_file() {
        let err = ArtifactError::Missing {
            artifact: ArtifactKind::FeatureMatrix,
            file: "tfidf_matrix.bin".to_string(),
            reason: "No such file or directory".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("feature matrix"));
        assert!(message.contains("tfidf_matrix.bin"));
    }
}
