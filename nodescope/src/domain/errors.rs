//! Structured error types for nodescope
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create report directory {path}: {source}")]
    CreateDirFailed { path: PathBuf, source: std::io::Error },

    #[error("Failed to write {table}: {source}")]
    WriteFailed { table: &'static str, source: std::io::Error },
}

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Report table not found: {0}")]
    MissingTable(PathBuf),

    #[error("Unexpected header in {table}: {found:?}")]
    BadHeader { table: String, found: String },

    #[error("Malformed row {line} in {table}: {reason}")]
    MalformedRow { table: String, line: usize, reason: String },

    #[error("Unsupported schema version {found} (expected {expected})")]
    SchemaMismatch { found: u32, expected: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("High-time threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f64),

    #[error("Unknown high-time metric {0:?} (expected \"total\" or \"matching\")")]
    UnknownMetric(String),
}
