//! Resolves the tail's settings from three layers, highest first:
//!
//! 1. explicit command-line options ([`TailOptions`]),
//! 2. the libpq environment variables (`PGHOST`, `PGPORT`, ...),
//! 3. built-in defaults.
//!
//! The password has no command-line option; it comes from `PGPASSWORD` or,
//! failing that, from an interactive prompt owned by the caller.

use crate::settings::{error::SettingsError, options::TailOptions};
use model::{
    core::identifiers::{Identifier, TableName},
    execution::{
        connection::{ConnectionParams, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_USER, SslMode},
        poll::{DEFAULT_INTERVAL_SECS, DEFAULT_SNAPSHOT_SIZE, PollConfig},
    },
};
use std::{collections::HashMap, time::Duration};
use tracing::debug;

pub mod error;
pub mod options;

pub const ENV_HOST: &str = "PGHOST";
pub const ENV_PORT: &str = "PGPORT";
pub const ENV_DATABASE: &str = "PGDATABASE";
pub const ENV_USER: &str = "PGUSER";
pub const ENV_PASSWORD: &str = "PGPASSWORD";
pub const ENV_SSLMODE: &str = "PGSSLMODE";
pub const ENV_OS_USER: &str = "USER";

/// Everything the tail needs, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub poll: PollConfig,
    pub connection: ConnectionParams,
}

impl Settings {
    pub fn resolve(
        opts: &TailOptions,
        env: &HashMap<String, String>,
    ) -> Result<Settings, SettingsError> {
        let poll = resolve_poll(opts)?;
        let connection = resolve_connection(opts, env)?;
        debug!(?poll, ?connection, "Resolved settings");
        Ok(Settings { poll, connection })
    }
}

fn resolve_poll(opts: &TailOptions) -> Result<PollConfig, SettingsError> {
    let names = opts.column_names();
    let table = match opts.table.as_deref().map(str::trim) {
        Some(table) if !table.is_empty() && !names.is_empty() => table,
        _ => return Err(SettingsError::MissingTableOrColumns),
    };

    let table: TableName = table.parse()?;
    let columns = names
        .into_iter()
        .map(Identifier::parse)
        .collect::<Result<Vec<_>, _>>()?;

    let interval = opts.interval.unwrap_or(DEFAULT_INTERVAL_SECS);
    let lines = opts
        .lines
        .unwrap_or(DEFAULT_SNAPSHOT_SIZE as i64)
        .max(1) as u64;

    let mut poll = PollConfig::new(table, columns, opts.format.unwrap_or_default())?
        .with_interval(Duration::from_secs(interval))
        .with_snapshot_size(lines);
    if let Some(separator) = &opts.separator {
        poll = poll.with_separator(separator.clone());
    }
    Ok(poll)
}

fn resolve_connection(
    opts: &TailOptions,
    env: &HashMap<String, String>,
) -> Result<ConnectionParams, SettingsError> {
    let from_env = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

    let host = opts
        .host
        .clone()
        .or_else(|| from_env(ENV_HOST))
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = match opts.port {
        Some(port) => port,
        None => match from_env(ENV_PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|e| {
                SettingsError::InvalidValue {
                    name: ENV_PORT.into(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_PORT,
        },
    };

    let user = opts
        .username
        .clone()
        .or_else(|| from_env(ENV_USER))
        .or_else(|| from_env(ENV_OS_USER))
        .unwrap_or_else(|| DEFAULT_USER.to_string());

    // Like libpq, the database defaults to the user name.
    let dbname = opts
        .dbname
        .clone()
        .or_else(|| from_env(ENV_DATABASE))
        .unwrap_or_else(|| user.clone());

    let sslmode = match opts.sslmode.clone().or_else(|| from_env(ENV_SSLMODE)) {
        Some(raw) => raw
            .parse::<SslMode>()
            .map_err(|reason| SettingsError::InvalidValue {
                name: "sslmode".into(),
                value: raw.clone(),
                reason,
            })?,
        None => SslMode::default(),
    };

    Ok(ConnectionParams {
        host,
        port,
        dbname,
        user,
        password: from_env(ENV_PASSWORD),
        sslmode,
    })
}
