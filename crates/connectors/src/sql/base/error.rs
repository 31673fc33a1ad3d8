use thiserror::Error;
use tokio_postgres::error::SqlState;

/// All errors coming from running a poll against the database.
#[derive(Debug, Error)]
pub enum DbError {
    /// The server rejected or failed the query. Carries the server's
    /// diagnostic text (`ERROR:  ...`, plus `DETAIL`/`HINT` when present).
    #[error("{0}")]
    Query(String),

    /// A cell could not be read back as text.
    #[error("Failed to decode column '{column}': {reason}")]
    Decode { column: String, reason: String },
}

impl From<tokio_postgres::Error> for DbError {
    fn from(err: tokio_postgres::Error) -> Self {
        DbError::Query(diagnostic(&err))
    }
}

/// Errors happening while establishing the connection.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("{}", diagnostic(.0))]
    Postgres(#[from] tokio_postgres::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),
}

impl ConnectorError {
    /// Whether the server turned us away for lack of (or a wrong) password.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ConnectorError::Postgres(err) => {
                matches!(
                    err.code(),
                    Some(&SqlState::INVALID_PASSWORD)
                        | Some(&SqlState::INVALID_AUTHORIZATION_SPECIFICATION)
                ) || err.to_string().contains("password missing")
            }
            ConnectorError::Tls(_) => false,
        }
    }
}

/// Formats a driver error the way `psql` prints server messages.
pub fn diagnostic(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => {
            let mut text = format!("{}:  {}", db.severity(), db.message());
            if let Some(detail) = db.detail() {
                text.push_str(&format!("\nDETAIL:  {detail}"));
            }
            if let Some(hint) = db.hint() {
                text.push_str(&format!("\nHINT:  {hint}"));
            }
            text
        }
        None => err.to_string(),
    }
}
