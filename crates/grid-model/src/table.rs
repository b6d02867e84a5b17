//! Cells, rows and the assembled table description.

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::ids::{RowIndex, SubtableId};
use crate::layout::LayoutVariant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Wire name, equal to the owning column's name.
    pub name: String,
    /// Position of the owning column in [`TableDescription::columns`].
    pub column: usize,
    /// String-encoded value, empty when unset.
    pub value: String,
    pub required: bool,
    pub editable: bool,
    pub blocked: bool,
}

impl Cell {
    /// An empty, editable cell mirroring the column at `index`.
    pub fn for_column(index: usize, column: &Column) -> Self {
        Self {
            name: column.name.clone(),
            column: index,
            value: String::new(),
            required: column.required,
            editable: true,
            blocked: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub title: Option<String>,
    pub code: Option<String>,
    pub index: Option<RowIndex>,
}

impl Row {
    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.name == name)
    }

    pub fn cell_mut(&mut self, name: &str) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|cell| cell.name == name)
    }
}

/// Entry of a subtable's code catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub code: String,
    pub title: String,
}

impl CodeEntry {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
        }
    }
}

/// Everything needed to render one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescription {
    pub subtable: Option<SubtableId>,
    pub name: String,
    pub variant: LayoutVariant,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    /// Codes offered by the add-row catalogue of dynamic layouts.
    pub catalogue: Vec<CodeEntry>,
    pub endpoint: String,
    /// Previously saved payload, verbatim.
    pub data: String,
}

impl TableDescription {
    pub fn new(variant: LayoutVariant) -> Self {
        Self {
            subtable: None,
            name: String::new(),
            variant,
            columns: Vec::new(),
            rows: Vec::new(),
            catalogue: Vec::new(),
            endpoint: String::new(),
            data: String::new(),
        }
    }

    /// The description returned when resolution fails.
    pub fn empty() -> Self {
        Self::new(LayoutVariant::HorizontalStaticUnique)
    }

    /// Callers render nothing for a description without columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn rows_with_code<'a>(&'a mut self, code: &'a str) -> impl Iterator<Item = &'a mut Row> {
        self.rows
            .iter_mut()
            .filter(move |row| row.code.as_deref() == Some(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::FieldKind;

    #[test]
    fn cell_copies_required_from_column() {
        let column = Column::new("Liczba", FieldKind::Number).with_required(true);
        let cell = Cell::for_column(3, &column);
        assert!(cell.required);
        assert!(cell.editable);
        assert!(!cell.blocked);
        assert_eq!(cell.column, 3);
    }

    #[test]
    fn empty_description() {
        assert!(TableDescription::empty().is_empty());
    }

    #[test]
    fn rows_with_code_filters() {
        let mut table = TableDescription::empty();
        table.rows.push(Row {
            code: Some("01".into()),
            ..Row::default()
        });
        table.rows.push(Row {
            code: Some("02".into()),
            ..Row::default()
        });
        assert_eq!(table.rows_with_code("02").count(), 1);
    }
}
