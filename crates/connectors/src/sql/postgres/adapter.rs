use crate::sql::{
    base::{
        error::{ConnectorError, DbError},
        source::TailSource,
    },
    postgres::{
        params::PgParamStore,
        row::to_batch,
        utils::{connect_client, pg_config},
    },
};
use async_trait::async_trait;
use model::{execution::connection::ConnectionParams, records::batch::ResultBatch};
use planner::query::{
    dialect::{self, Dialect},
    tail::TailQuery,
};
use tokio_postgres::Client;
use tracing::{debug, info};

/// A single Postgres session held for the life of the tail.
pub struct PgAdapter {
    client: Client,
    dialect: dialect::Postgres,
}

impl PgAdapter {
    pub async fn connect(params: &ConnectionParams) -> Result<Self, ConnectorError> {
        info!(target = %params, sslmode = %params.sslmode, "Connecting to Postgres");
        let client = connect_client(pg_config(params)).await?;
        Ok(PgAdapter {
            client,
            dialect: dialect::Postgres,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl TailSource for PgAdapter {
    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    async fn fetch(&self, query: &TailQuery) -> Result<ResultBatch, DbError> {
        debug!(sql = %query.sql, params = ?query.params, "Executing poll");
        let statement = self.client.prepare(&query.sql).await?;
        let bindings = PgParamStore::from_values(query.params.clone());
        let rows = self.client.query(&statement, &bindings.as_refs()).await?;
        to_batch(&statement, &rows)
    }
}
