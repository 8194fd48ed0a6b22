//! Error types for the feature pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {}: {reason}", path.display())]
    SourceRead { path: PathBuf, reason: String },

    #[error("unknown title `{title}` for passenger {passenger_id}")]
    UnknownTitle { passenger_id: i64, title: String },

    #[error("cannot parse a title from name `{name}` of passenger {passenger_id}")]
    MalformedName { passenger_id: i64, name: String },

    #[error("passenger id {0} appears more than once")]
    DuplicatePassengerId(i64),

    #[error("column `{0}` not found")]
    MissingColumn(String),

    #[error("column `{name}` does not hold {expected} values")]
    ColumnType { name: String, expected: &'static str },

    #[error("cannot impute {column}: {reason}")]
    Imputation { column: String, reason: String },

    #[error("fare quantile edges are not unique: {0:?}")]
    DegenerateBins(Vec<f64>),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to write {}: {source}", path.display())]
    SinkWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl PipelineError {
    pub fn source_read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SourceRead {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn sink_write(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        Self::SinkWrite {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn imputation(column: &str, reason: impl Into<String>) -> Self {
        Self::Imputation {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
