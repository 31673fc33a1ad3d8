use crate::core::identifiers::{Identifier, TableName};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, time::Duration};
use thiserror::Error;

pub const DEFAULT_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_SNAPSHOT_SIZE: u64 = 5;
pub const DEFAULT_SEPARATOR: &str = " | ";

/// Name of the extra field carrying the JSON encoding of a row in
/// structured mode. Reserved: no requested column may use it.
pub const STRUCTURED_FIELD: &str = "__pg_tail_row";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollConfigError {
    #[error("at least one column (the key) is required")]
    NoColumns,

    #[error("column '{0}' is requested more than once")]
    DuplicateColumn(String),

    #[error("column name '{0}' is reserved")]
    ReservedColumn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    /// Columns padded to a common width and joined by the separator.
    #[default]
    AlignedText,

    /// One JSON object per row.
    StructuredPerRow,
}

/// What to tail and how to print it. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    table: TableName,
    columns: Vec<Identifier>,
    mode: OutputMode,
    separator: String,
    align: bool,
    interval: Duration,
    snapshot_size: u64,
}

impl PollConfig {
    /// The first column is the ordering key.
    pub fn new(
        table: TableName,
        columns: Vec<Identifier>,
        mode: OutputMode,
    ) -> Result<Self, PollConfigError> {
        if columns.is_empty() {
            return Err(PollConfigError::NoColumns);
        }

        let mut seen = HashSet::new();
        for col in &columns {
            if col.as_str() == STRUCTURED_FIELD {
                return Err(PollConfigError::ReservedColumn(col.to_string()));
            }
            if !seen.insert(col.as_str()) {
                return Err(PollConfigError::DuplicateColumn(col.to_string()));
            }
        }

        Ok(PollConfig {
            table,
            columns,
            mode,
            separator: DEFAULT_SEPARATOR.to_string(),
            align: true,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            snapshot_size: DEFAULT_SNAPSHOT_SIZE,
        })
    }

    /// A custom separator turns column alignment off.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self.align = false;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sizes below one are raised to one.
    pub fn with_snapshot_size(mut self, size: u64) -> Self {
        self.snapshot_size = size.max(1);
        self
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn columns(&self) -> &[Identifier] {
        &self.columns
    }

    pub fn key(&self) -> &Identifier {
        &self.columns[0]
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn align(&self) -> bool {
        self.align
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn snapshot_size(&self) -> u64 {
        self.snapshot_size
    }
}
