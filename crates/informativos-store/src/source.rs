//! Raw tabular sources: spreadsheet workbooks, CSV and (with the `parquet`
//! feature) Parquet files.
//!
//! Every source is reduced to a [`RawSheet`] of optional text cells so the
//! loader normalises a single shape regardless of where the data came from.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, StringArray};
use arrow::compute::cast;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use calamine::{Data, Reader, open_workbook_auto};
use tracing::debug;

use crate::StoreError;

/// Header row plus data rows. `None` marks an empty cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawSheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    /// Index of the first header equal to `name` after trimming.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Cell text, `None` when the cell is empty or the row is short.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Read a source file, dispatching on its extension.
pub fn read_source(path: &Path) -> Result<RawSheet, StoreError> {
    if !path.exists() {
        return Err(StoreError::SourceNotFound(path.to_path_buf()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let sheet = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path)?,
        "csv" => read_csv(path)?,
        #[cfg(feature = "parquet")]
        "parquet" => read_parquet(path)?,
        other => return Err(StoreError::UnsupportedFormat(other.to_string())),
    };
    debug!(
        path = %path.display(),
        columns = sheet.headers.len(),
        rows = sheet.num_rows(),
        "read raw source"
    );
    Ok(sheet)
}

// ── Workbooks ──

/// First worksheet; its first row is the header.
fn read_workbook(path: &Path) -> Result<RawSheet, StoreError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| StoreError::Spreadsheet(format!("no worksheet in {}", path.display())))??;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|c| cell_text(c).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    let rows = rows.map(|r| r.iter().map(cell_text).collect()).collect();
    Ok(RawSheet { headers, rows })
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(format_float(*f)),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Integral floats render without a fractional part ("1050", not "1050.0").
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

// ── CSV ──

/// All columns are read as text; the header row supplies the names.
fn read_csv(path: &Path) -> Result<RawSheet, StoreError> {
    let mut file = File::open(path)?;
    let format = Format::default().with_header(true);
    let (inferred, _) = format.infer_schema(&mut file, Some(0))?;
    file.seek(SeekFrom::Start(0))?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| Field::new(f.name(), DataType::Utf8, true))
        .collect();
    let headers = fields.iter().map(|f| f.name().clone()).collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema).with_header(true).build(file)?;
    let mut rows = Vec::new();
    for batch in reader {
        append_rows(&batch?, &mut rows)?;
    }
    Ok(RawSheet { headers, rows })
}

// ── Parquet ──

/// Typed columns are cast to text (dates become `YYYY-MM-DD`).
#[cfg(feature = "parquet")]
fn read_parquet(path: &Path) -> Result<RawSheet, StoreError> {
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;
    let mut rows = Vec::new();
    for batch in reader {
        append_rows(&batch?, &mut rows)?;
    }
    Ok(RawSheet { headers, rows })
}

/// Append every row of `batch` as text cells, casting non-string columns.
fn append_rows(batch: &RecordBatch, rows: &mut Vec<Vec<Option<String>>>) -> Result<(), StoreError> {
    let text_columns = batch
        .columns()
        .iter()
        .map(|col| cast(col.as_ref(), &DataType::Utf8))
        .collect::<Result<Vec<_>, _>>()?;
    let text_columns: Vec<&StringArray> = text_columns
        .iter()
        .map(|col| {
            col.as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| StoreError::Other("cast to Utf8 did not yield a string array".into()))
        })
        .collect::<Result<_, _>>()?;

    for i in 0..batch.num_rows() {
        rows.push(
            text_columns
                .iter()
                .map(|col| {
                    if col.is_null(i) {
                        None
                    } else {
                        Some(col.value(i).to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(())
}
