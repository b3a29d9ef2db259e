use crate::dataset::{read_dataset, write_dataset, ReadOptions};
use crate::error::Result;
use crate::key::load_key;
use crate::options::{OaepHash, Operation};
use crate::transform::{transform_dataset, TransformReport};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for a single run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    /// Defaults to `<input>.encrypted` / `<input>.decrypted`
    pub output: Option<PathBuf>,
    pub delimiter: u8,
    pub output_delimiter: u8,
    /// Zero-based column indices, duplicates allowed
    pub columns: Vec<usize>,
    pub key: PathBuf,
    pub operation: Operation,
    /// 1-based header row, `None` for headerless input
    pub header: Option<usize>,
    pub oaep_hash: OaepHash,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            delimiter: b':',
            output_delimiter: b':',
            columns: Vec::new(),
            key: PathBuf::new(),
            operation: Operation::default(),
            header: None,
            oaep_hash: OaepHash::default(),
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output: PathBuf,
    pub rows: usize,
    pub width: usize,
    pub report: TransformReport,
}

/// `<input>.<extension>`, keeping any extension the input already has
pub fn default_output_path(input: &Path, operation: Operation) -> PathBuf {
    let mut os = input.as_os_str().to_os_string();
    os.push(".");
    os.push(operation.file_extension());
    PathBuf::from(os)
}

/// Read, transform and write one file
///
/// Every fatal check (columns, key) happens before the output path is
/// touched, so a failed run never leaves an output file behind.
pub fn run(options: &RunOptions) -> Result<RunSummary> {
    let read_options = ReadOptions {
        delimiter: options.delimiter,
        header: options.header,
    };
    let mut dataset = read_dataset(&options.input, &read_options)?;
    let selection = dataset.select(&options.columns)?;
    let key = load_key(&options.key, options.operation.key_kind())?;

    info!(
        input = %options.input.display(),
        rows = dataset.row_count(),
        columns = ?selection.columns(),
        operation = %options.operation,
        "Processing"
    );
    let report = transform_dataset(&mut dataset, &selection, &key, options.oaep_hash)?;

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&options.input, options.operation));
    write_dataset(&dataset, &output, options.output_delimiter)?;
    info!(output = %output.display(), "Wrote output");

    Ok(RunSummary {
        output,
        rows: dataset.row_count(),
        width: dataset.width(),
        report,
    })
}
