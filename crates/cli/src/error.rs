use crate::shutdown::ExitCode;
use connectors::sql::base::error::ConnectorError;
use engine_config::settings::error::SettingsError;
use engine_runtime::error::TailError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Config(String),

    #[error("Failed to read password: {0}")]
    Prompt(std::io::Error),

    #[error("Connection to database failed.\n{0}")]
    Connect(ConnectorError),

    #[error("{0}")]
    Tail(#[from] TailError),
}

impl CliError {
    /// Invocation problems are reported but, like `--help`, end with a zero
    /// status. Anything that went wrong after that point is a failure.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Settings(_) => ExitCode::Success,
            CliError::Config(_)
            | CliError::Prompt(_)
            | CliError::Connect(_)
            | CliError::Tail(_) => ExitCode::GeneralError,
        }
    }
}
