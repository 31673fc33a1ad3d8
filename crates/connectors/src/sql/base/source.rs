use crate::sql::base::error::DbError;
use async_trait::async_trait;
use model::records::batch::ResultBatch;
use planner::query::{dialect::Dialect, tail::TailQuery};

/// The connection as seen by the poll loop: run one query, get every row
/// back as text, or fail with the server's diagnostic.
#[async_trait]
pub trait TailSource: Send + Sync {
    /// SQL flavour the queries for this source must be rendered in.
    fn dialect(&self) -> &dyn Dialect;

    async fn fetch(&self, query: &TailQuery) -> Result<ResultBatch, DbError>;
}
