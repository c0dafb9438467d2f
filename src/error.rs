//! Domain error types.
//!
//! Library-style modules return [`Result`]; `main` and the config loader
//! work in `anyhow` and downcast to pick an exit code.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// One or more input fields failed validation.
    #[error("invalid input: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// An import was rejected as a whole.
    #[error("import rejected: {0}")]
    Import(String),

    /// A grading scale definition is not a total partition of its range.
    #[error("invalid grading scale: {0}")]
    Scale(String),

    #[error("store error: {0}")]
    Store(String),

    /// The text-generation service failed or returned something unusable.
    #[error("assistant error: {0}")]
    Assistant(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Shorthand for a single-field validation failure.
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::Validation(vec![message.into()])
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_) | Error::Import(_) | Error::Scale(_) | Error::NotFound(_) => 2,
            Error::Store(_) | Error::Assistant(_) => 1,
            Error::Io(_) | Error::Json(_) | Error::Csv(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
