use model::records::batch::ResultBatch;

/// Per-column display widths for one batch: the longest of the field name
/// and every cell in that column. Measured afresh for each poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnWidths(Vec<usize>);

impl ColumnWidths {
    /// Measures the first `columns` fields of the batch.
    pub fn measure(batch: &ResultBatch, columns: usize) -> Self {
        let mut widths: Vec<usize> = batch
            .fields
            .iter()
            .take(columns)
            .map(|name| name.chars().count())
            .collect();

        for row in &batch.rows {
            for (i, width) in widths.iter_mut().enumerate() {
                *width = (*width).max(row.text(i).chars().count());
            }
        }

        ColumnWidths(widths)
    }

    pub fn get(&self, index: usize) -> usize {
        self.0.get(index).copied().unwrap_or(0)
    }
}
