use crate::sql::base::error::DbError;
use model::records::{batch::ResultBatch, row::Row};
use tokio_postgres::{Row as PgRow, Statement};

/// Converts a result whose columns are all text (see the tail query's
/// `CAST(.. AS TEXT)` projection) into a batch.
pub fn to_batch(statement: &Statement, rows: &[PgRow]) -> Result<ResultBatch, DbError> {
    let fields = statement
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();

    let rows = rows.iter().map(to_row).collect::<Result<Vec<_>, _>>()?;
    Ok(ResultBatch::new(fields, rows))
}

fn to_row(row: &PgRow) -> Result<Row, DbError> {
    let cells = row
        .columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            row.try_get::<_, Option<String>>(i)
                .map_err(|err| DbError::Decode {
                    column: col.name().to_string(),
                    reason: err.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Row::new(cells))
}
