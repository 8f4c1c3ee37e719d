//! Domain errors raised by the report pipeline.
//!
//! These travel inside `anyhow::Error` at the application layer; callers that
//! need to tell them apart use `downcast_ref::<ReportError>()`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Persistence was requested for a table or plot without a destination.
    #[error("no filename to save {what}")]
    MissingOutputName { what: &'static str },

    #[error("cannot compute speedup: parallel time {tp} with {nt} processes")]
    DivisionByZero { tp: f64, nt: u32 },

    #[error("malformed measurement file name: {name}")]
    MalformedFileName { name: String },

    #[error("no serial baseline (marker {marker:?}) in {}", .folder.display())]
    MissingBaseline { folder: PathBuf, marker: String },

    #[error("more than one serial baseline in {}: {first} and {second}", .folder.display())]
    DuplicateBaseline {
        folder: PathBuf,
        first: String,
        second: String,
    },

    #[error("column {column:?} not found in {file}")]
    MissingColumn { file: String, column: String },

    #[error("column {column:?} in {file} has no samples")]
    EmptyColumn { file: String, column: String },

    #[error("column {column:?} in {file}: {value:?} is not a number")]
    InvalidSample {
        file: String,
        column: String,
        value: String,
    },

    #[error("invalid {what} pattern: {reason}")]
    InvalidPattern { what: &'static str, reason: String },
}
