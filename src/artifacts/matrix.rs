//! Sparse feature matrix and its binary encoding.
//!
//! File format: tfidf_matrix.bin
//!
//! Header (29 bytes):
//! - version: u8 (1)
//! - rows: u64 (little-endian)
//! - cols: u64 (little-endian)
//! - nnz: u64 (little-endian)
//! - checksum: u32 (CRC32 of header fields before checksum)
//!
//! Rows (repeated `rows` times):
//! - row_nnz: u32 (little-endian)
//! - entries: [(column: u32, value: f32); row_nnz] (little-endian)

use std::io::{Cursor, Read};

/// Current file format version
const FORMAT_VERSION: u8 = 1;

/// Header size in bytes: version(1) + rows(8) + cols(8) + nnz(8) + checksum(4)
const HEADER_SIZE: usize = 29;

/// Errors that can occur while building or decoding a matrix.
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Version mismatch: file version {0}, supported version {1}")]
    VersionMismatch(u8, u8),

    #[error("Checksum mismatch: file may be corrupted")]
    ChecksumMismatch,

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Row {row}: column {col} out of range for {cols} columns")]
    ColumnOutOfRange { row: usize, col: usize, cols: usize },

    #[error("Row {row}: column indices must be strictly increasing")]
    UnsortedColumns { row: usize },

    #[error("Row {row}, column {col}: value {value} is negative or not finite")]
    InvalidValue { row: usize, col: usize, value: f32 },

    #[error("Row {row}: expected {expected} columns, got {got}")]
    DimensionMismatch { row: usize, expected: usize, got: usize },
}

/// A borrowed view of one matrix row.
#[derive(Debug, Clone, Copy)]
pub struct SparseRow<'a> {
    pub indices: &'a [u32],
    pub values: &'a [f32],
    /// L2 norm, accumulated in `f64` so large finite weights cannot overflow.
    pub norm: f64,
}

/// Row-major sparse matrix (CSR) of non-negative term weights.
///
/// Immutable once built. Row norms are computed up front so scoring only
/// needs the dot products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    cols: usize,
    /// `indptr[r]..indptr[r + 1]` is the slice of row `r` in `indices`/`values`
    indptr: Vec<usize>,
    indices: Vec<u32>,
    values: Vec<f32>,
    norms: Vec<f64>,
}

impl FeatureMatrix {
    /// Build from per-row `(column, value)` lists.
    ///
    /// Columns must be strictly increasing within each row and below `cols`;
    /// values must be finite and non-negative. Explicit zeros are dropped.
    pub fn from_rows(cols: usize, rows: Vec<Vec<(u32, f32)>>) -> Result<Self, MatrixError> {
        let nnz = rows.iter().map(|r| r.len()).sum();
        let mut matrix = Self {
            cols,
            indptr: Vec::with_capacity(rows.len() + 1),
            indices: Vec::with_capacity(nnz),
            values: Vec::with_capacity(nnz),
            norms: Vec::with_capacity(rows.len()),
        };
        matrix.indptr.push(0);

        for (row, entries) in rows.into_iter().enumerate() {
            matrix.push_row(row, entries)?;
        }

        Ok(matrix)
    }

    /// Build from dense rows, all of which must have `cols` entries.
    pub fn from_dense(cols: usize, rows: Vec<Vec<f32>>) -> Result<Self, MatrixError> {
        let mut sparse = Vec::with_capacity(rows.len());
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != cols {
                return Err(MatrixError::DimensionMismatch {
                    row,
                    expected: cols,
                    got: values.len(),
                });
            }
            sparse.push(
                values
                    .into_iter()
                    .enumerate()
                    .map(|(col, value)| (col as u32, value))
                    .collect(),
            );
        }
        Self::from_rows(cols, sparse)
    }

    fn push_row(&mut self, row: usize, entries: Vec<(u32, f32)>) -> Result<(), MatrixError> {
        let mut prev: Option<u32> = None;
        let mut sum_sq = 0.0f64;

        for (col, value) in entries {
            if col as usize >= self.cols {
                return Err(MatrixError::ColumnOutOfRange {
                    row,
                    col: col as usize,
                    cols: self.cols,
                });
            }
            if prev.is_some_and(|p| col <= p) {
                return Err(MatrixError::UnsortedColumns { row });
            }
            if !value.is_finite() || value < 0.0 {
                return Err(MatrixError::InvalidValue {
                    row,
                    col: col as usize,
                    value,
                });
            }
            prev = Some(col);

            if value == 0.0 {
                continue;
            }
            sum_sq += f64::from(value) * f64::from(value);
            self.indices.push(col);
            self.values.push(value);
        }

        self.indptr.push(self.indices.len());
        self.norms.push(sum_sq.sqrt());
        Ok(())
    }

    /// Number of rows (items).
    pub fn rows(&self) -> usize {
        self.norms.len()
    }

    /// Number of columns (vocabulary terms).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored non-zero entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row(&self, row: usize) -> Option<SparseRow<'_>> {
        let start = *self.indptr.get(row)?;
        let end = *self.indptr.get(row + 1)?;
        Some(SparseRow {
            indices: &self.indices[start..end],
            values: &self.values[start..end],
            norm: self.norms[row],
        })
    }

    /// Decode the binary format described in the module docs.
    pub fn decode(data: &[u8]) -> Result<Self, MatrixError> {
        let mut reader = Cursor::new(data);
        let header = read_header(&mut reader)?;

        let rows = usize::try_from(header.rows)
            .map_err(|_| MatrixError::InvalidFormat("row count too large".to_string()))?;
        let cols = usize::try_from(header.cols)
            .map_err(|_| MatrixError::InvalidFormat("column count too large".to_string()))?;

        // Each row takes at least 4 bytes, so a bogus header cannot force a
        // huge allocation.
        let remaining = data.len() - HEADER_SIZE;
        if rows > remaining / 4 {
            return Err(MatrixError::InvalidFormat(format!(
                "header claims {rows} rows but only {remaining} bytes follow"
            )));
        }

        let mut sparse = Vec::with_capacity(rows);
        let mut total: u64 = 0;
        for _ in 0..rows {
            let row_nnz = read_u32(&mut reader)? as usize;
            let mut entries = Vec::with_capacity(row_nnz.min(remaining / 8));
            for _ in 0..row_nnz {
                let col = read_u32(&mut reader)?;
                let value = f32::from_le_bytes(read_array(&mut reader)?);
                entries.push((col, value));
            }
            total += row_nnz as u64;
            sparse.push(entries);
        }

        if total != header.nnz {
            return Err(MatrixError::InvalidFormat(format!(
                "header claims {} non-zeros, rows contain {total}",
                header.nnz
            )));
        }
        if reader.position() as usize != data.len() {
            return Err(MatrixError::InvalidFormat(
                "trailing bytes after last row".to_string(),
            ));
        }

        Self::from_rows(cols, sparse)
    }

    /// Encode to the binary format described in the module docs.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.rows() * 4 + self.nnz() * 8);

        let mut header = [0u8; HEADER_SIZE];
        header[0] = FORMAT_VERSION;
        header[1..9].copy_from_slice(&(self.rows() as u64).to_le_bytes());
        header[9..17].copy_from_slice(&(self.cols as u64).to_le_bytes());
        header[17..25].copy_from_slice(&(self.nnz() as u64).to_le_bytes());
        let checksum = crc32fast::hash(&header[0..25]);
        header[25..29].copy_from_slice(&checksum.to_le_bytes());
        out.extend_from_slice(&header);

        for row in 0..self.rows() {
            let start = self.indptr[row];
            let end = self.indptr[row + 1];
            out.extend_from_slice(&((end - start) as u32).to_le_bytes());
            for i in start..end {
                out.extend_from_slice(&self.indices[i].to_le_bytes());
                out.extend_from_slice(&self.values[i].to_le_bytes());
            }
        }

        out
    }
}

#[derive(Debug)]
struct Header {
    rows: u64,
    cols: u64,
    nnz: u64,
}

fn read_header<R: Read>(reader: &mut R) -> Result<Header, MatrixError> {
    let mut header_bytes = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_bytes)?;

    let version = header_bytes[0];
    if version > FORMAT_VERSION {
        return Err(MatrixError::VersionMismatch(version, FORMAT_VERSION));
    }

    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(&header_bytes[25..29]);
    if u32::from_le_bytes(checksum) != crc32fast::hash(&header_bytes[0..25]) {
        return Err(MatrixError::ChecksumMismatch);
    }

    Ok(Header {
        rows: le_u64(&header_bytes[1..9]),
        cols: le_u64(&header_bytes[9..17]),
        nnz: le_u64(&header_bytes[17..25]),
    })
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N], MatrixError> {
    let mut bytes = [0u8; N];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, MatrixError> {
    Ok(u32::from_le_bytes(read_array(reader)?))
}
