use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::dataset::{Column, ColumnValues, Dataset};
use crate::error::{Error, Result};
use crate::value::{format_number, is_missing_token};

/// Load a CSV file with a header row into a dataset.
pub fn read_csv(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    read_csv_from_reader(file)
}

/// Load CSV from any reader.
///
/// A column is numeric when every non-missing cell parses as `f64`;
/// otherwise it is categorical. Empty, `NA`, `NaN` and `null` cells are
/// missing, in any letter case.
pub fn read_csv_from_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect::<Vec<_>>();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(Error::InvalidDataset(format!(
                "row {} has {} field(s), expected {}",
                row_idx + 1,
                record.len(),
                headers.len()
            )));
        }
        for (col_idx, raw) in record.iter().enumerate() {
            let cell = if is_missing_token(raw) {
                None
            } else {
                Some(raw.trim().to_string())
            };
            cells[col_idx].push(cell);
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| infer_column(name, values))
        .collect();
    Dataset::new(columns)
}

/// Write a dataset as CSV. Returns the number of bytes written.
pub fn write_csv(path: &Path, dataset: &Dataset) -> Result<u64> {
    let writer = BufWriter::new(File::create(path)?);
    write_csv_to_writer(writer, dataset)
}

/// Write a dataset as CSV to any writer, with deterministic column order.
pub fn write_csv_to_writer<W: Write>(writer: W, dataset: &Dataset) -> Result<u64> {
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(dataset.column_names())?;

    for row_idx in 0..dataset.row_count() {
        let record: Vec<String> = dataset
            .columns()
            .iter()
            .map(|column| cell_to_csv(&column.values, row_idx))
            .collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    let counting = writer
        .into_inner()
        .map_err(|err| Error::Io(err.into_error()))?;
    Ok(counting.bytes_written())
}

fn infer_column(name: String, values: Vec<Option<String>>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = values
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(raw) => raw.parse::<f64>().ok().map(Some),
        })
        .collect();

    match parsed {
        Some(numbers) => Column::numeric(name, numbers),
        None => Column::categorical(name, values),
    }
}

fn cell_to_csv(values: &ColumnValues, row: usize) -> String {
    match values {
        ColumnValues::Numeric(values) => values
            .get(row)
            .copied()
            .flatten()
            .map(format_number)
            .unwrap_or_default(),
        ColumnValues::Categorical(values) => values
            .get(row)
            .cloned()
            .flatten()
            .unwrap_or_default(),
    }
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
