use serde::{Deserialize, Serialize};

/// One result row, cells in field order, each in the server's text form.
/// `None` is SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Option<String>>,
}

impl Row {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Row { cells }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }

    /// Cell text as printed: NULL and out-of-range cells read as empty.
    pub fn text(&self, index: usize) -> &str {
        self.get(index).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<S: Into<String>> FromIterator<Option<S>> for Row {
    fn from_iter<T: IntoIterator<Item = Option<S>>>(iter: T) -> Self {
        Row::new(iter.into_iter().map(|c| c.map(Into::into)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_and_missing_cells_read_as_empty() {
        let row: Row = vec![Some("1"), None].into_iter().collect();
        assert_eq!(row.text(0), "1");
        assert_eq!(row.get(1), None);
        assert_eq!(row.text(1), "");
        assert_eq!(row.text(7), "");
    }
}
