//! Error taxonomy for toolchain resolution and configuration.
//!
//! Resolution and configuration failures are errors; execution outcomes
//! (non-zero exit codes, timeouts) are data and never surface here.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// No candidate (supplied, cached, bundled, or on PATH) produced a
    /// usable executable.
    #[error("{name} not found under {searched}")]
    NotFound { name: String, searched: String },

    /// A located candidate failed validation. For an explicit
    /// caller-supplied candidate this is raised without trying any
    /// fallback.
    #[error("invalid binary {path}: {reason}")]
    InvalidBinary { path: PathBuf, reason: String },

    /// A version string did not match `\d+(\.\d+){0,2}`.
    #[error("invalid version format: {0:?}")]
    InvalidVersion(String),

    /// A required argument was read before being given a value.
    #[error("argument {0} has not been initialized")]
    MissingArgument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}
