use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Load-time errors: the dataset is unavailable
// ---------------------------------------------------------------------------

/// The dataset could not be brought into memory.
///
/// Fatal for the dashboard at startup: nothing can be shown without data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("reading Arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    /// `row` is 1-based: the file line for CSV (the header is line 1), the
    /// record number for Parquet.
    #[error("row {row}, column '{column}': cannot parse '{value}'")]
    BadValue {
        row: u64,
        column: &'static str,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Criteria errors: rejected before reaching the filter
// ---------------------------------------------------------------------------

/// A user-supplied range that cannot be used as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CriteriaError {
    #[error("{field} range is inverted: {low} > {high}")]
    InvertedRange {
        field: &'static str,
        low: f64,
        high: f64,
    },

    #[error("{field} range has a NaN bound")]
    NotANumber { field: &'static str },

    #[error("date range is inverted: {start} is after {end}")]
    InvertedDates { start: NaiveDate, end: NaiveDate },
}
