use std::path::PathBuf;

use crate::data::source::SourceFormat;

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Anything that can go wrong between a source location and a parsed
/// [`Dataset`](crate::data::model::Dataset).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("cannot tell the format of '{location}'; set it explicitly (xlsx, csv, json, parquet)")]
    UnknownFormat { location: String },

    #[error("'{url}' is an HTML viewer page, not raw content; use {raw_url}")]
    NotRawContent { url: String, raw_url: String },

    #[error("source '{url}' is unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("source '{url}' answered with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("payload looks like {detected}, but the source is configured as {declared}")]
    FormatMismatch {
        declared: SourceFormat,
        detected: &'static str,
    },

    #[error("malformed {format} payload: {message}")]
    Malformed {
        format: SourceFormat,
        message: String,
    },
}

impl LoadError {
    pub(crate) fn malformed(format: SourceFormat, message: impl Into<String>) -> Self {
        LoadError::Malformed {
            format,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

/// A column name that is not part of the loaded dataset's schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("column '{column}' not found (available: {})", .available.join(", "))]
pub struct InvalidColumnError {
    pub column: String,
    pub available: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("writing CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("flushing CSV: {0}")]
    Io(#[from] std::io::Error),
}

/// Union of the failures of a full load → filter → export run.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    InvalidColumn(#[from] InvalidColumnError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
