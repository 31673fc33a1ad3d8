use crate::sql::base::error::ConnectorError;
use model::execution::connection::{ConnectionParams, SslMode};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{Client, Config, NoTls, config::SslMode as PgSslMode};
use tracing::{error, warn};

pub const APPLICATION_NAME: &str = "pg-tail";

pub fn pg_config(params: &ConnectionParams) -> Config {
    let mut config = Config::new();
    config
        .host(&params.host)
        .port(params.port)
        .dbname(&params.dbname)
        .user(&params.user)
        .application_name(APPLICATION_NAME);
    if let Some(password) = &params.password {
        config.password(password);
    }
    config.ssl_mode(match params.sslmode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
    });
    config
}

pub(crate) async fn connect_client(config: Config) -> Result<Client, ConnectorError> {
    match config.get_ssl_mode() {
        PgSslMode::Disable => connect_without_tls(config).await,
        PgSslMode::Prefer => match connect_with_tls(config.clone()).await {
            Ok(client) => Ok(client),
            Err(err) if err.is_auth_failure() => Err(err),
            Err(error) => {
                warn!(%error, "Postgres TLS handshake failed, retrying without TLS");
                connect_without_tls(config).await
            }
        },
        _ => connect_with_tls(config).await,
    }
}

pub(crate) async fn connect_with_tls(config: Config) -> Result<Client, ConnectorError> {
    let connector = TlsConnector::builder().build()?;
    let tls = MakeTlsConnector::new(connector);
    let (client, connection) = config.connect(tls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}

pub(crate) async fn connect_without_tls(mut config: Config) -> Result<Client, ConnectorError> {
    config.ssl_mode(PgSslMode::Disable);
    let (client, connection) = config.connect(NoTls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}
