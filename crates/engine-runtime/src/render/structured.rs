use crate::{error::TailError, render::BatchRenderer};
use model::records::batch::ResultBatch;
use planner::query::tail::STRUCTURED_FIELD;
use std::io::Write;

/// One JSON object per line, built server-side from the requested columns.
/// No header. Each line is flushed as soon as it is written so a consumer
/// reading a pipe sees rows as they arrive.
pub struct StructuredRows;

impl BatchRenderer for StructuredRows {
    fn render(
        &self,
        batch: &ResultBatch,
        _with_header: bool,
        out: &mut dyn Write,
    ) -> Result<usize, TailError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let index = batch
            .field_index(STRUCTURED_FIELD)
            .ok_or_else(|| TailError::MissingStructuredField(STRUCTURED_FIELD.to_string()))?;

        for row in &batch.rows {
            out.write_all(row.text(index).as_bytes())?;
            out.write_all(b"\n")?;
            out.flush()?;
        }

        Ok(batch.row_count())
    }
}
