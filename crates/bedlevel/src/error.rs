//! Error types for bed-level generation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving, generating or writing a program.
#[derive(Error, Debug)]
pub enum BedLevelError {
    /// The answer source ran dry while a required answer was pending.
    #[error("input closed while waiting for {0}")]
    InputClosed(&'static str),

    /// The bed is too small to fit the probing inset on one axis.
    #[error("bed {axis} dimension of {size}mm is too small, it must exceed {minimum}mm")]
    BedTooSmall {
        /// Axis name ("X" or "Y").
        axis: &'static str,
        /// Configured bed size on that axis (mm).
        size: i64,
        /// Smallest size that is still rejected (mm).
        minimum: i64,
    },

    /// The cycle count would produce more probe points than allowed.
    #[error("{cycles} cycles would exceed the limit of {maximum} probe points")]
    TooManyPoints {
        /// Requested cycle count.
        cycles: i64,
        /// Largest allowed number of points.
        maximum: usize,
    },

    /// No built-in printer profile matches the given key.
    #[error("unknown printer: {0}")]
    UnknownPrinter(String),

    /// Reading an answer failed.
    #[error("failed to read input: {0}")]
    Input(#[from] std::io::Error),

    /// A preset file could not be parsed.
    #[error("invalid preset {path}: {source}")]
    Preset {
        /// Preset file path.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// Reading input or writing the output file failed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Result type for bed-level operations.
pub type Result<T> = std::result::Result<T, BedLevelError>;
