use crate::key::KeyKind;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors: any of these stops the run before an output file exists.
#[derive(Error, Debug)]
pub enum ColumnCryptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid column {index}: input has {width} columns (indices start at 0)")]
    InvalidColumn { index: usize, width: usize },

    #[error("No columns selected")]
    NoColumns,

    #[error("Invalid header row {row}: input has {rows} rows")]
    InvalidHeaderRow { row: usize, rows: usize },

    #[error("Row {row} has {found} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid delimiter {0:?}: must be a single ASCII character")]
    InvalidDelimiter(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Wrong key? expecting {expected} key in {}: {reason}", path.display())]
    KeyFormat {
        path: PathBuf,
        expected: KeyKind,
        reason: String,
    },

    #[error("Column {0} already exists")]
    ColumnNameConflict(String),
}

impl ColumnCryptError {
    /// Bad arguments or bad column selection, detected before processing.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidColumn { .. }
                | Self::NoColumns
                | Self::InvalidHeaderRow { .. }
                | Self::RaggedRow { .. }
                | Self::InvalidDelimiter(_)
                | Self::UnsupportedAlgorithm(_)
        )
    }

    /// Process exit code for this error kind
    pub fn exit_code(&self) -> u8 {
        match self {
            _ if self.is_configuration() => 2,
            Self::KeyFormat { .. } => 3,
            Self::ColumnNameConflict(_) => 5,
            _ => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, ColumnCryptError>;

/// Value-level failure for a single cell. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellError {
    #[error("value of {len} bytes exceeds the {max} byte limit for this key")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("invalid base64: {0}")]
    InvalidEncoding(String),

    #[error("empty ciphertext")]
    EmptyCiphertext,

    #[error("decryption failed (wrong key? wrong column?)")]
    Decryption,
}
