use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a [`crate::Trace`] from raw sequences.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    #[error(
        "trace sequences differ in length: {distance_deltas} distance deltas, \
         {time_deltas} time deltas, {positions} positions"
    )]
    LengthMismatch {
        distance_deltas: usize,
        time_deltas: usize,
        positions: usize,
    },
}

/// Errors raised while reading or writing trace data files.
#[derive(Error, Debug)]
pub enum TraceFileError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed trace file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("invalid trace JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no start time found for {0} (expected tracks['<epoch>'] or an epoch file name)")]
    MissingStartTime(PathBuf),
    #[error("invalid trace in {path}: {source}")]
    Trace {
        path: PathBuf,
        #[source]
        source: TraceError,
    },
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Errors raised while loading or validating an [`crate::AnalysisConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
