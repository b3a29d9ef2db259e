use crate::dataset::{ColumnId, ColumnSelection, Dataset};
use crate::error::Result;
use crate::key::KeyHandle;
use crate::options::{OaepHash, Operation};
use crate::pipeline::{decrypt_column, encrypt_column, hash_column, ColumnReport};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::{debug, warn};

/// What a transform did to the dataset
#[derive(Debug, Clone)]
pub struct TransformReport {
    pub operation: Operation,
    pub columns: Vec<ColumnReport>,
    /// Ciphertext columns appended (encrypt only), in selection order
    pub added: Vec<ColumnId>,
}

impl TransformReport {
    pub fn failed_cells(&self) -> usize {
        self.columns.iter().map(|c| c.failures.len()).sum()
    }
}

/// Hash the selected columns in place and append an encrypted copy of each
///
/// For every selected column the raw values are encrypted into
/// `ColumnId::Encrypted(n)` first; only then is the source overwritten
/// with the hash of those same raw values.
pub fn encrypt_dataset(
    dataset: &mut Dataset,
    selection: &ColumnSelection,
    key: &RsaPublicKey,
    hash: OaepHash,
) -> Result<TransformReport> {
    let mut columns = Vec::with_capacity(selection.len());
    let mut added = Vec::with_capacity(selection.len());

    for &index in selection.columns() {
        let source = ColumnId::Source(index);
        let target = ColumnId::Encrypted(index);
        let raw = dataset.column(index);

        let encrypted = encrypt_column(source, &raw, key, hash);
        let label = dataset.encrypted_label(index);
        dataset.push_column(target, label, encrypted.cells)?;

        dataset.replace_column(index, hash_column(&raw));

        debug!(column = %source, target = %target, cells = raw.len(), "Encrypted column");
        log_failures(&encrypted.report);
        columns.push(encrypted.report);
        added.push(target);
    }

    Ok(TransformReport {
        operation: Operation::Encrypt,
        columns,
        added,
    })
}

/// Replace the selected ciphertext columns with plaintext, in place
pub fn decrypt_dataset(
    dataset: &mut Dataset,
    selection: &ColumnSelection,
    key: &RsaPrivateKey,
    hash: OaepHash,
) -> Result<TransformReport> {
    let mut columns = Vec::with_capacity(selection.len());

    for &index in selection.columns() {
        let source = ColumnId::Source(index);
        let decrypted = decrypt_column(source, &dataset.column(index), key, hash);
        dataset.replace_column(index, decrypted.cells);

        debug!(column = %source, cells = decrypted.report.cells, "Decrypted column");
        log_failures(&decrypted.report);
        columns.push(decrypted.report);
    }

    Ok(TransformReport {
        operation: Operation::Decrypt,
        columns,
        added: Vec::new(),
    })
}

/// Encrypt with a public key, decrypt with a private key
pub fn transform_dataset(
    dataset: &mut Dataset,
    selection: &ColumnSelection,
    key: &KeyHandle,
    hash: OaepHash,
) -> Result<TransformReport> {
    match key {
        KeyHandle::Public(public) => encrypt_dataset(dataset, selection, public, hash),
        KeyHandle::Private(private) => decrypt_dataset(dataset, selection, private, hash),
    }
}

fn log_failures(report: &ColumnReport) {
    for failure in &report.failures {
        warn!(
            column = %report.column,
            row = failure.row + 1,
            "Value-level failure, cell left empty: {}",
            failure.error
        );
    }
}
