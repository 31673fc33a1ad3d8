use model::{core::identifiers::IdentifierError, execution::poll::PollConfigError};
use thiserror::Error;

/// Errors raised while turning raw options into settings. All of them are
/// reported before any connection is attempted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Missing table or key (column).")]
    MissingTableOrColumns,

    #[error("Invalid identifier: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("Invalid columns: {0}")]
    Columns(#[from] PollConfigError),

    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}
