//! Parquet export of a (filtered) working table.

use std::fs::File;
use std::path::Path;

use parquet::arrow::ArrowWriter;
use tracing::info;

use crate::StoreError;
use crate::table::InformativoTable;

/// Write the table's batch to `path`, overwriting any existing file.
pub fn write_parquet(table: &InformativoTable, path: &Path) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, table.batch().schema(), None)?;
    writer.write(table.batch())?;
    writer.close()?;
    info!(path = %path.display(), rows = table.num_rows(), "exported table");
    Ok(())
}
