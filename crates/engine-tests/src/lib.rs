#![allow(dead_code)]

use connectors::sql::postgres::adapter::PgAdapter;
use engine_config::settings::{Settings, options::TailOptions};
use model::execution::connection::{ConnectionParams, SslMode};
use std::collections::HashMap;

pub mod utils;

// Test database, the same one the docker-compose setup starts.
const TEST_PG_HOST: &str = "localhost";
const TEST_PG_PORT: u16 = 5432;
const TEST_PG_USER: &str = "user";
const TEST_PG_PASSWORD: &str = "password";
const TEST_PG_DATABASE: &str = "testdb";

fn test_env() -> HashMap<String, String> {
    HashMap::from([("PGPASSWORD".to_string(), TEST_PG_PASSWORD.to_string())])
}

fn test_params() -> ConnectionParams {
    ConnectionParams {
        host: TEST_PG_HOST.into(),
        port: TEST_PG_PORT,
        dbname: TEST_PG_DATABASE.into(),
        user: TEST_PG_USER.into(),
        password: Some(TEST_PG_PASSWORD.into()),
        sslmode: SslMode::Disable,
    }
}

async fn pg_adapter() -> PgAdapter {
    PgAdapter::connect(&test_params())
        .await
        .expect("connect postgres")
}

/// Resolves settings the way the CLI does, pointed at the test database.
fn settings(opts: TailOptions) -> Settings {
    let opts = TailOptions {
        host: Some(TEST_PG_HOST.into()),
        port: Some(TEST_PG_PORT),
        username: Some(TEST_PG_USER.into()),
        dbname: Some(TEST_PG_DATABASE.into()),
        sslmode: Some("disable".into()),
        interval: Some(0),
        ..opts
    };
    Settings::resolve(&opts, &test_env()).expect("resolve settings")
}
