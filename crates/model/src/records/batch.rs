use crate::records::row::Row;
use serde::{Deserialize, Serialize};

/// Field names and rows returned by a single poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBatch {
    pub fields: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultBatch {
    pub fn new(fields: Vec<String>, rows: Vec<Row>) -> Self {
        ResultBatch { fields, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }
}
