use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("source file not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("essential column '{0}' not found in source")]
    MissingColumn(String),

    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "parquet")]
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification of a failed load, for user-facing reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailure {
    FileNotFound,
    Validation,
    Processing,
}

impl StoreError {
    pub fn kind(&self) -> LoadFailure {
        match self {
            Self::SourceNotFound(_) => LoadFailure::FileNotFound,
            Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound => LoadFailure::FileNotFound,
            Self::MissingColumn(_) | Self::UnsupportedFormat(_) => LoadFailure::Validation,
            _ => LoadFailure::Processing,
        }
    }
}

impl From<calamine::Error> for StoreError {
    fn from(e: calamine::Error) -> Self {
        Self::Spreadsheet(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            StoreError::SourceNotFound("x.xlsx".into()).kind(),
            LoadFailure::FileNotFound
        );
        assert_eq!(
            StoreError::MissingColumn("judgment_date".into()).kind(),
            LoadFailure::Validation
        );
        assert_eq!(
            StoreError::UnsupportedFormat("txt".into()).kind(),
            LoadFailure::Validation
        );
        assert_eq!(
            StoreError::Spreadsheet("bad zip".into()).kind(),
            LoadFailure::Processing
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(StoreError::Io(io).kind(), LoadFailure::FileNotFound);
    }
}
