//! Header-plus-rows tables exchanged with the tabular codec.

use serde::{Deserialize, Serialize};

use super::kind::CollectionKind;

/// A decoded or to-be-encoded table of string cells.
///
/// Rows are positional: cell `i` belongs to `headers[i]`. Rows shorter than
/// the header read as blank for the missing columns.
///
/// # Examples
///
/// ```
/// use evac_core::Table;
///
/// let mut table = Table::new(vec!["shelterId".to_owned(), "capacity".to_owned()]);
/// table.push_row(vec!["S001".to_owned()]);
///
/// assert_eq!(table.cell(0, "shelterId"), Some("S001"));
/// assert_eq!(table.cell(0, "capacity"), Some(""));
/// assert_eq!(table.cell(0, "riskLevel"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Column names, in order.
    pub headers: Vec<String>,

    /// Data rows, each a list of cells aligned with `headers`.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given headers.
    #[must_use]
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Creates an empty table headed by `kind`'s field list.
    #[must_use]
    pub fn for_kind(kind: CollectionKind) -> Self {
        Self::new(kind.fields().iter().map(|f| (*f).to_owned()).collect())
    }

    /// Appends a data row.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Returns the index of the column named `name`, ignoring surrounding whitespace.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Returns the cell at `row` under column `name`.
    ///
    /// `None` if the row or column does not exist; `Some("")` if the row is
    /// too short to reach the column.
    #[must_use]
    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let column = self.column(name)?;
        let cells = self.rows.get(row)?;
        Some(cells.get(column).map_or("", String::as_str))
    }

    /// Returns the number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_kind_headers() {
        let table = Table::for_kind(CollectionKind::Assignments);
        assert_eq!(table.headers, vec!["citizenId", "shelterId", "checkInDate"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_column_ignores_whitespace() {
        let table = Table::new(vec![" name ".to_owned(), "age".to_owned()]);
        assert_eq!(table.column("name"), Some(0));
        assert_eq!(table.column("age"), Some(1));
        assert_eq!(table.column("citizenId"), None);
    }

    #[test]
    fn test_cell_out_of_range_row() {
        let table = Table::new(vec!["name".to_owned()]);
        assert_eq!(table.cell(3, "name"), None);
    }
}
