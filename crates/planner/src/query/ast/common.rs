//! Defines common, reusable AST nodes for building SQL queries.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(name: &str) -> Self {
        TableRef {
            schema: None,
            name: name.to_string(),
        }
    }
}

impl From<&model::core::identifiers::TableName> for TableRef {
    fn from(table: &model::core::identifiers::TableName) -> Self {
        TableRef {
            schema: table.schema.as_ref().map(|s| s.to_string()),
            name: table.name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

/// Explicit placement of NULLs. Postgres puts them first under `DESC` and
/// last under `ASC` when left unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}
