use std::path::PathBuf;

use thiserror::Error;

/// Failures that abandon a whole input file. Nothing is rendered when one
/// of these is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("no data found in {}", path.display())]
    Empty { path: PathBuf },

    #[error("unrecognized layout in {}: expected {expected}, found [{found}]", path.display())]
    SchemaMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

/// Failures scoped to one data row. The row is dropped and processing
/// continues with the next one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("line {line}: missing field `{field}`")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: malformed value {value:?} in `{field}`")]
    MalformedValue {
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// Non-fatal emission failures. The affected series or chart is skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("series `{label}` has no points")]
    EmptySeries { label: String },

    #[error("chart `{title}` has nothing to render")]
    NothingToRender { title: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("moving-average window must be at least 1")]
    ZeroWindow,

    #[error("bucket size must be at least 1")]
    ZeroBucket,

    #[error("downsampling stride must be at least 1")]
    ZeroStride,

    #[error("at least one view must be configured")]
    NoViews,
}
