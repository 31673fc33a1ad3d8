use model::execution::poll::OutputMode;
use serde::{Deserialize, Serialize};

/// Options as given on the command line, before layering with the
/// environment and defaults. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailOptions {
    pub dbname: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub sslmode: Option<String>,

    pub table: Option<String>,
    /// Each entry may itself be a comma-separated list.
    pub columns: Vec<String>,
    pub interval: Option<u64>,
    pub separator: Option<String>,
    pub lines: Option<i64>,
    pub format: Option<OutputMode>,
}

impl TailOptions {
    /// Column names in order, with comma lists flattened and blanks dropped.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }
}
