use connectors::sql::base::error::DbError;
use thiserror::Error;

/// Errors that end the tail. None of them are retried.
#[derive(Debug, Error)]
pub enum TailError {
    /// The poll query failed on the server.
    #[error("{0}")]
    Database(#[from] DbError),

    /// Writing to the output stream failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Structured output was requested but the result carries no encoded row.
    #[error("Result has no '{0}' field")]
    MissingStructuredField(String),
}

impl TailError {
    /// The reader went away (e.g. the output was piped into `head`).
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, TailError::Output(err) if err.kind() == std::io::ErrorKind::BrokenPipe)
    }
}
