//! columncrypt - protect sensitive columns of delimited files
//!
//! Selected columns are replaced with a SHA-256 fingerprint and an RSA-OAEP
//! encrypted copy is appended as a new column. Only the private-key holder
//! can turn that copy back into plaintext; the fingerprint stays usable for
//! joins and de-duplication.
//!
//! ## Pipeline
//!
//! ```text
//! Encrypt: Read → Select → Load public key → [Encrypt → Append `n_enc`] → [Hash in place] → Write
//! Decrypt: Read → Select → Load private key → [Decrypt in place] → Write
//! ```
//!
//! - **Select**: zero-based indices, de-duplicated, validated before anything else
//! - **Encrypt**: RSA-OAEP (SHA-1 by default, SHA-256 optional), base64 text
//! - **Hash**: SHA-256 of the raw value, lowercase hex
//! - **Decrypt**: base64 decode then RSA-OAEP; failures leave an empty cell
//!
//! A cell that cannot be transformed never stops the run. Bad arguments,
//! bad column indices and unusable keys stop it before an output file exists.
//!
//! ## Example
//!
//! ```no_run
//! use columncrypt::cli::{run, RunOptions};
//! use columncrypt::Operation;
//! use std::path::PathBuf;
//!
//! let encrypt = RunOptions {
//!     input: PathBuf::from("people.txt"),
//!     columns: vec![1, 3],
//!     key: PathBuf::from("public.pem"),
//!     ..Default::default()
//! };
//! let summary = run(&encrypt).unwrap();
//!
//! let decrypt = RunOptions {
//!     input: summary.output,
//!     columns: vec![4, 5],
//!     key: PathBuf::from("private.pem"),
//!     operation: Operation::Decrypt,
//!     ..Default::default()
//! };
//! run(&decrypt).unwrap();
//! ```

pub mod cli;
pub mod dataset;
pub mod error;
pub mod key;
pub mod logging;
pub mod options;
pub mod pipeline;
pub mod transform;

pub use dataset::{Cell, ColumnId, ColumnSelection, Dataset};
pub use error::{CellError, ColumnCryptError, Result};
pub use key::{load_key, KeyHandle, KeyKind};
pub use options::{OaepHash, Operation};
pub use transform::{transform_dataset, TransformReport};
