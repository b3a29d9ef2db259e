use crate::dataset::{Cell, ColumnId};
use crate::error::CellError;
use crate::options::OaepHash;
use crate::pipeline::{decrypt_value, encrypt_value, hash_value};
use rsa::{RsaPrivateKey, RsaPublicKey};

/// Result of transforming one cell
pub type CellOutcome = std::result::Result<Cell, CellError>;

/// A cell that could not be transformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFailure {
    /// Zero-based data row (header excluded)
    pub row: usize,
    pub error: CellError,
}

/// Per-column tally of what happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReport {
    pub column: ColumnId,
    pub cells: usize,
    pub failures: Vec<CellFailure>,
}

impl ColumnReport {
    pub fn succeeded(&self) -> usize {
        self.cells - self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Transformed cells plus the report that goes with them
#[derive(Debug, Clone)]
pub struct ProcessedColumn {
    pub cells: Vec<Cell>,
    pub report: ColumnReport,
}

/// Apply `transform` to every cell, substituting an empty cell for failures
/// A failing cell never stops the rest of the column
pub fn process_column<F>(column: ColumnId, cells: &[Cell], mut transform: F) -> ProcessedColumn
where
    F: FnMut(&Cell) -> CellOutcome,
{
    let mut output = Vec::with_capacity(cells.len());
    let mut failures = Vec::new();

    for (row, cell) in cells.iter().enumerate() {
        match transform(cell) {
            Ok(value) => output.push(value),
            Err(error) => {
                failures.push(CellFailure { row, error });
                output.push(Cell::empty());
            }
        }
    }

    ProcessedColumn {
        cells: output,
        report: ColumnReport {
            column,
            cells: cells.len(),
            failures,
        },
    }
}

/// Encrypt every cell of a column into base64 ciphertext
pub fn encrypt_column(
    column: ColumnId,
    cells: &[Cell],
    key: &RsaPublicKey,
    hash: OaepHash,
) -> ProcessedColumn {
    process_column(column, cells, |cell| {
        encrypt_value(cell.as_bytes(), key, hash).map(Cell::from)
    })
}

/// Decrypt every cell of a ciphertext column
pub fn decrypt_column(
    column: ColumnId,
    cells: &[Cell],
    key: &RsaPrivateKey,
    hash: OaepHash,
) -> ProcessedColumn {
    process_column(column, cells, |cell| {
        decrypt_value(cell.as_bytes(), key, hash).map(Cell::new)
    })
}

/// Replace every cell with its SHA-256 hex digest
pub fn hash_column(cells: &[Cell]) -> Vec<Cell> {
    cells
        .iter()
        .map(|cell| Cell::from(hash_value(cell.as_bytes())))
        .collect()
}
