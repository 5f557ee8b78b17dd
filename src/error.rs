//! Application-level error type returned by all command handlers.
//!
//! `AppError` is serialized to `{ kind, message }` JSON payloads so scripts
//! driving the CLI with `--json` can pattern-match on a stable `kind` string.

use crate::postprocessor::PostProcessorError;

/// Top-level error returned by command handlers.
///
/// Serialized with serde's adjacently-tagged representation:
/// `{ "kind": "<variant>", "message": "<human-readable text>" }`
#[derive(Debug, thiserror::Error, serde::Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum AppError {
    /// The input program does not exist on disk.
    #[error("file not found")]
    FileNotFound,

    /// A generic I/O error; the inner [`std::io::Error`] is converted to a
    /// string at the system boundary so it remains serializable.
    #[error("{0}")]
    Io(String),

    /// The machine profile could not be read, parsed, or validated.
    #[error("{0}")]
    Config(String),

    /// The input program could not be read.
    #[error("{0}")]
    ProgramLoad(String),

    /// The output program could not be written.
    #[error("{0}")]
    ProgramSave(String),
}

impl From<PostProcessorError> for AppError {
    /// Convert a [`PostProcessorError`] into an [`AppError::Config`].
    fn from(e: PostProcessorError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    /// Convert an [`std::io::Error`] into an [`AppError::Io`].
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
