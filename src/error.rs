// src/error.rs

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Errors raised while loading, querying or exporting the vehicle population.
#[derive(Debug, Error)]
pub enum EvError {
    /// A field could not be coerced to its type. `row` is the 1-based data row,
    /// or 0 when the header itself is at fault.
    #[error("row {row}, column '{column}': {reason} (value: {value:?})")]
    Format {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    /// The session or export destination is in the wrong state for the call.
    #[error("invalid state: {0}")]
    State(String),

    /// The settings file could not be parsed. `origin` is the file path, or
    /// `<inline>` for YAML passed as text.
    #[error("config {origin}: {reason}")]
    Config { origin: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet: {0}")]
    Parquet(#[from] ParquetError),

    #[error("arrow: {0}")]
    Arrow(#[from] ArrowError),

    #[error("glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("glob: {0}")]
    Glob(#[from] glob::GlobError),
}

impl EvError {
    pub fn format(
        row: usize,
        column: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Format {
            row,
            column: column.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    pub fn config(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    pub fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

pub type Result<T> = std::result::Result<T, EvError>;
