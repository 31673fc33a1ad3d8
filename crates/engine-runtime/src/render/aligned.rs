use crate::{
    error::TailError,
    render::{BatchRenderer, widths::ColumnWidths},
};
use model::records::batch::ResultBatch;
use std::io::Write;

/// `id | created_at          | message` style output.
///
/// Widths come from the current batch only. With alignment off (a custom
/// separator was chosen) cells are written as-is; the header is padded
/// either way.
pub struct AlignedText {
    separator: String,
    align: bool,
    columns: usize,
}

impl AlignedText {
    pub fn new(separator: &str, align: bool, columns: usize) -> Self {
        Self {
            separator: separator.to_string(),
            align,
            columns,
        }
    }

    fn write_line<'a>(
        &self,
        out: &mut dyn Write,
        cells: impl Iterator<Item = &'a str>,
        widths: &ColumnWidths,
        pad: bool,
    ) -> std::io::Result<()> {
        for (i, cell) in cells.enumerate() {
            if i > 0 {
                out.write_all(self.separator.as_bytes())?;
            }
            if pad {
                write!(out, "{cell:<width$}", width = widths.get(i))?;
            } else {
                out.write_all(cell.as_bytes())?;
            }
        }
        out.write_all(b"\n")
    }
}

impl BatchRenderer for AlignedText {
    fn render(
        &self,
        batch: &ResultBatch,
        with_header: bool,
        out: &mut dyn Write,
    ) -> Result<usize, TailError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let columns = self.columns.min(batch.field_count());
        let widths = ColumnWidths::measure(batch, columns);

        if with_header {
            let names = batch.fields.iter().take(columns).map(String::as_str);
            self.write_line(out, names, &widths, true)?;
        }

        for row in &batch.rows {
            let cells = (0..columns).map(|i| row.text(i));
            self.write_line(out, cells, &widths, self.align)?;
        }

        out.flush()?;
        Ok(batch.row_count())
    }
}
