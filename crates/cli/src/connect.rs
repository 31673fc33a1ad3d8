use crate::error::CliError;
use connectors::sql::postgres::adapter::PgAdapter;
use model::execution::connection::ConnectionParams;
use std::io::IsTerminal;
use tracing::debug;

/// Opens the session, asking for a password first when `-W` was given, or
/// after the server rejects us for lack of one if someone is at the
/// terminal to answer.
pub async fn connect(params: ConnectionParams, force_prompt: bool) -> Result<PgAdapter, CliError> {
    let params = if force_prompt {
        let password = prompt_password(&params)?;
        params.with_password(password)
    } else {
        params
    };

    match PgAdapter::connect(&params).await {
        Ok(adapter) => Ok(adapter),
        Err(err)
            if err.is_auth_failure()
                && params.password.is_none()
                && std::io::stdin().is_terminal() =>
        {
            debug!(user = %params.user, "Server requires a password");
            let password = prompt_password(&params)?;
            let params = params.with_password(password);
            PgAdapter::connect(&params).await.map_err(CliError::Connect)
        }
        Err(err) => Err(CliError::Connect(err)),
    }
}

fn prompt_password(params: &ConnectionParams) -> Result<String, CliError> {
    rpassword::prompt_password(format!("Password for user {}: ", params.user))
        .map_err(CliError::Prompt)
}
