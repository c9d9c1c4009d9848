//! Errors for the graph builder
//!
//! Only whole-run failures live here. Per-paper problems are counted in
//! `RunStats` and never abort the run.

use citeforge_common::errors::{AppError, ErrorCode};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Bibliography not readable: {path}: {source}")]
    Bibliography {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported bibliography format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    App(#[from] AppError),
}

impl GraphError {
    /// Error code shared with the common taxonomy
    pub fn code(&self) -> ErrorCode {
        match self {
            GraphError::Bibliography { .. } | GraphError::Io(_) => ErrorCode::IoError,
            GraphError::UnsupportedFormat { .. } => ErrorCode::InvalidFormat,
            GraphError::Csv(_) | GraphError::Json(_) => ErrorCode::SerializationError,
            GraphError::App(e) => e.code(),
        }
    }
}
