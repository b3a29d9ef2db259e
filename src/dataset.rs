use crate::error::{ColumnCryptError, Result};
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// One cell value. Raw bytes; never coerced to a number or re-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cell(Vec<u8>);

impl Cell {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Placeholder written for cells that failed to transform
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<Vec<u8>> for Cell {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Cell {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Stable column handle, independent of any header text
///
/// Ciphertext columns live in their own variant, so they can never
/// collide with an input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnId {
    /// Column `n` of the input file (zero-based)
    Source(usize),
    /// Ciphertext derived from input column `n`
    Encrypted(usize),
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(n) => write!(f, "{}", n),
            Self::Encrypted(n) => write!(f, "{}_enc", n),
        }
    }
}

/// How to read a delimited file
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub delimiter: u8,
    /// 1-based header row; rows above it are discarded
    pub header: Option<usize>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b':',
            header: None,
        }
    }
}

/// Rectangular table of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    ids: Vec<ColumnId>,
    labels: Option<Vec<Cell>>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Build a dataset; every row (and the header, if any) must have the same width
    pub fn new(labels: Option<Vec<Cell>>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let width = labels
            .as_ref()
            .map(Vec::len)
            .or_else(|| rows.first().map(Vec::len))
            .unwrap_or(0);

        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(ColumnCryptError::RaggedRow {
                    row: i + 1,
                    expected: width,
                    found: row.len(),
                });
            }
        }

        Ok(Self {
            ids: (0..width).map(ColumnId::Source).collect(),
            labels,
            rows,
        })
    }

    /// Parse delimited text
    pub fn from_reader<R: Read>(reader: R, options: &ReadOptions) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records: Vec<(u64, Vec<Cell>)> = Vec::new();
        for record in csv_reader.byte_records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let cells = record.iter().map(|field| Cell::new(field.to_vec())).collect();
            records.push((line, cells));
        }

        let (labels, body) = match options.header {
            None | Some(0) => (None, records),
            Some(row) if row > records.len() => {
                return Err(ColumnCryptError::InvalidHeaderRow {
                    row,
                    rows: records.len(),
                });
            }
            Some(row) => {
                let mut rest = records.split_off(row - 1);
                let (_, header) = rest.remove(0);
                (Some(header), rest)
            }
        };

        let width = labels
            .as_ref()
            .map(Vec::len)
            .or_else(|| body.first().map(|(_, cells)| cells.len()))
            .unwrap_or(0);
        if let Some((line, cells)) = body.iter().find(|(_, cells)| cells.len() != width) {
            return Err(ColumnCryptError::RaggedRow {
                row: *line as usize,
                expected: width,
                found: cells.len(),
            });
        }

        let rows = body.into_iter().map(|(_, cells)| cells).collect();
        let dataset = Self::new(labels, rows)?;
        debug!(
            rows = dataset.row_count(),
            columns = dataset.width(),
            "Parsed dataset"
        );
        Ok(dataset)
    }

    /// Write as delimited text; the header row is written when present
    pub fn write_to<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_writer(writer);

        if let Some(labels) = &self.labels {
            csv_writer.write_record(labels)?;
        }
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.ids.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_ids(&self) -> &[ColumnId] {
        &self.ids
    }

    pub fn labels(&self) -> Option<&[Cell]> {
        self.labels.as_deref()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Current position of a column
    pub fn position(&self, id: ColumnId) -> Option<usize> {
        self.ids.iter().position(|&existing| existing == id)
    }

    /// Snapshot of one column's cells, top to bottom
    pub fn column(&self, position: usize) -> Vec<Cell> {
        self.rows.iter().map(|row| row[position].clone()).collect()
    }

    /// Overwrite a column in place
    pub fn replace_column(&mut self, position: usize, cells: Vec<Cell>) {
        assert_eq!(
            cells.len(),
            self.rows.len(),
            "replacement column must have one cell per row"
        );
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row[position] = cell;
        }
    }

    /// Append a new column at the right edge
    pub fn push_column(&mut self, id: ColumnId, label: Option<Cell>, cells: Vec<Cell>) -> Result<()> {
        if self.position(id).is_some() {
            return Err(ColumnCryptError::ColumnNameConflict(id.to_string()));
        }
        assert_eq!(
            cells.len(),
            self.rows.len(),
            "new column must have one cell per row"
        );

        if let Some(labels) = self.labels.as_mut() {
            labels.push(label.unwrap_or_else(|| Cell::from(id.to_string())));
        }
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        self.ids.push(id);
        Ok(())
    }

    /// Header label for a ciphertext column, unique among existing labels
    ///
    /// `<label>_enc`, then `<label>_enc_2`, `<label>_enc_3`, ... on collision.
    /// Returns `None` when the dataset has no header.
    pub fn encrypted_label(&self, position: usize) -> Option<Cell> {
        let labels = self.labels.as_ref()?;
        let mut base = labels[position].as_bytes().to_vec();
        base.extend_from_slice(b"_enc");

        let taken = |candidate: &[u8]| labels.iter().any(|l| l.as_bytes() == candidate);
        if !taken(base.as_slice()) {
            return Some(Cell::new(base));
        }
        (2..)
            .map(|n| {
                let mut candidate = base.clone();
                candidate.extend_from_slice(format!("_{}", n).as_bytes());
                candidate
            })
            .find(|candidate| !taken(candidate.as_slice()))
            .map(Cell::new)
    }

    /// Validate and de-duplicate a raw column list against this dataset
    pub fn select(&self, columns: &[usize]) -> Result<ColumnSelection> {
        ColumnSelection::new(columns, self.width())
    }
}

/// Read a delimited file into memory
pub fn read_dataset(path: &Path, options: &ReadOptions) -> Result<Dataset> {
    let file = std::fs::File::open(path)?;
    Dataset::from_reader(file, options)
}

/// Write a dataset to `path` via a temporary file in the same directory
/// The destination only appears once the whole file has been written
pub fn write_dataset(dataset: &Dataset, path: &Path, delimiter: u8) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    dataset.write_to(tmp.as_file_mut(), delimiter)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Validated, de-duplicated source column indices in first-seen order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    columns: Vec<usize>,
}

impl ColumnSelection {
    pub fn new(columns: &[usize], width: usize) -> Result<Self> {
        if columns.is_empty() {
            return Err(ColumnCryptError::NoColumns);
        }

        let mut unique: Vec<usize> = Vec::with_capacity(columns.len());
        for &index in columns {
            if index >= width {
                return Err(ColumnCryptError::InvalidColumn { index, width });
            }
            if !unique.contains(&index) {
                unique.push(index);
            }
        }
        Ok(Self { columns: unique })
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(text: &str, header: Option<usize>) -> Result<Dataset> {
        let options = ReadOptions {
            delimiter: b':',
            header,
        };
        Dataset::from_reader(text.as_bytes(), &options)
    }

    fn render(dataset: &Dataset, delimiter: u8) -> String {
        let mut out = Vec::new();
        dataset.write_to(&mut out, delimiter).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_without_header() {
        let ds = parse("a:b:c\n1:2:3\n", None).unwrap();
        assert_eq!(ds.width(), 3);
        assert_eq!(ds.row_count(), 2);
        assert!(ds.labels().is_none());
        assert_eq!(
            ds.column_ids(),
            &[ColumnId::Source(0), ColumnId::Source(1), ColumnId::Source(2)]
        );
        assert_eq!(ds.column(1), vec![Cell::from("b"), Cell::from("2")]);
    }

    #[test]
    fn test_parse_with_header_discards_rows_above() {
        let ds = parse("# export\nname:mail\nann:a@x\n", Some(2)).unwrap();
        assert_eq!(ds.row_count(), 1);
        assert_eq!(ds.labels().unwrap(), &[Cell::from("name"), Cell::from("mail")]);
        assert_eq!(ds.rows()[0], vec![Cell::from("ann"), Cell::from("a@x")]);
    }

    #[test]
    fn test_header_zero_means_no_header() {
        let ds = parse("x:y\n", Some(0)).unwrap();
        assert!(ds.labels().is_none());
        assert_eq!(ds.row_count(), 1);
    }

    #[test]
    fn test_header_row_out_of_range() {
        let err = parse("x:y\n", Some(3)).unwrap_err();
        assert!(matches!(err, ColumnCryptError::InvalidHeaderRow { row: 3, rows: 1 }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_ragged_row_rejected() {
        let err = parse("1:2:3\n4:5\n", None).unwrap_err();
        match err {
            ColumnCryptError::RaggedRow { row, expected, found } => {
                assert_eq!(row, 2);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_delimiter_and_quoting() {
        let options = ReadOptions {
            delimiter: b',',
            header: None,
        };
        let ds = Dataset::from_reader("\"Doe, Jane\",42\n".as_bytes(), &options).unwrap();
        assert_eq!(ds.width(), 2);
        assert_eq!(ds.rows()[0][0], Cell::from("Doe, Jane"));
        assert_eq!(render(&ds, b','), "\"Doe, Jane\",42\n");
    }

    #[test]
    fn test_selection_dedupes_in_order() {
        let sel = ColumnSelection::new(&[3, 1, 3, 0, 1], 4).unwrap();
        assert_eq!(sel.columns(), &[3, 1, 0]);
        assert_eq!(sel.len(), 3);
    }

    #[test]
    fn test_selection_rejects_out_of_range() {
        let ds = parse("1:2:3\n", None).unwrap();
        let err = ds.select(&[0, 3]).unwrap_err();
        assert!(matches!(err, ColumnCryptError::InvalidColumn { index: 3, width: 3 }));
        assert!(matches!(ds.select(&[]), Err(ColumnCryptError::NoColumns)));
    }

    #[test]
    fn test_push_column_conflict() {
        let mut ds = parse("1:2\n", None).unwrap();
        ds.push_column(ColumnId::Encrypted(0), None, vec![Cell::from("x")])
            .unwrap();
        let err = ds
            .push_column(ColumnId::Encrypted(0), None, vec![Cell::from("y")])
            .unwrap_err();
        assert!(matches!(err, ColumnCryptError::ColumnNameConflict(ref id) if id == "0_enc"));
        assert_eq!(ds.width(), 3);
        assert_eq!(ds.position(ColumnId::Encrypted(0)), Some(2));
    }

    #[test]
    fn test_encrypted_label_is_unique() {
        let ds = parse("mail:mail_enc:mail_enc_2\n", Some(1)).unwrap();
        assert_eq!(ds.encrypted_label(0), Some(Cell::from("mail_enc_3")));
        assert_eq!(ds.encrypted_label(1), Some(Cell::from("mail_enc_enc")));

        let plain = parse("1:2\n", None).unwrap();
        assert_eq!(plain.encrypted_label(0), None);
    }

    #[test]
    fn test_replace_and_write_with_header() {
        let mut ds = parse("k:v\n1:2\n", Some(1)).unwrap();
        ds.replace_column(1, vec![Cell::from("two")]);
        let label = ds.encrypted_label(1);
        ds.push_column(ColumnId::Encrypted(1), label, vec![Cell::from("ct")])
            .unwrap();
        assert_eq!(render(&ds, b':'), "k:v:v_enc\n1:two:ct\n");
    }

    #[test]
    fn test_write_dataset_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let ds = parse("1:2\n3:4\n", None).unwrap();
        write_dataset(&ds, &path, b',').unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1,2\n3,4\n");
        // only the destination is left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_non_utf8_cells_survive() {
        let ds = Dataset::new(None, vec![vec![Cell::new(vec![0xff, 0xfe])]]).unwrap();
        let mut out = Vec::new();
        ds.write_to(&mut out, b':').unwrap();
        assert_eq!(out, vec![0xff, 0xfe, b'\n']);
    }
}
