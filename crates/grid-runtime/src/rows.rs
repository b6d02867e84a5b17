//! Ordered row records with monotonic indices.

use chrono::{DateTime, Utc};
use grid_model::RowIndex;

use crate::field::Field;

#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    pub index: RowIndex,
    pub code: Option<String>,
    pub title: Option<String>,
    pub fields: Vec<Field>,
    /// End of the transient success state after a save.
    pub flash_until: Option<DateTime<Utc>>,
}

impl RowRecord {
    pub fn new(index: RowIndex, code: Option<String>, title: Option<String>, fields: Vec<Field>) -> Self {
        Self {
            index,
            code,
            title,
            fields,
            flash_until: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.name() == name)
    }

    /// Any editable field holds user-entered data.
    pub fn has_data(&self) -> bool {
        self.fields.iter().any(Field::has_user_data)
    }

    pub fn clear_issues(&mut self) {
        for field in &mut self.fields {
            field.issue = None;
        }
    }

    pub fn is_flashing(&self, now: DateTime<Utc>) -> bool {
        self.flash_until.is_some_and(|until| now < until)
    }
}

/// Rows of one grid. Indices are handed out by a counter that never goes
/// back, so an index is never reused after a delete or a failed fetch.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    rows: Vec<RowRecord>,
    next: u64,
}

impl RowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next index.
    pub fn allocate(&mut self) -> RowIndex {
        let index = RowIndex(self.next);
        self.next += 1;
        index
    }

    /// The index the next call to [`RowSet::allocate`] returns.
    pub fn peek_next(&self) -> RowIndex {
        RowIndex(self.next)
    }

    /// Append a row, moving the counter past its index.
    pub fn push(&mut self, row: RowRecord) {
        if row.index.0 >= self.next {
            self.next = row.index.0 + 1;
        }
        self.rows.push(row);
    }

    pub fn remove(&mut self, index: RowIndex) -> Option<RowRecord> {
        let position = self.rows.iter().position(|row| row.index == index)?;
        Some(self.rows.remove(position))
    }

    pub fn get(&self, index: RowIndex) -> Option<&RowRecord> {
        self.rows.iter().find(|row| row.index == index)
    }

    pub fn get_mut(&mut self, index: RowIndex) -> Option<&mut RowRecord> {
        self.rows.iter_mut().find(|row| row.index == index)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.rows.iter().any(|row| row.code.as_deref() == Some(code))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowRecord> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, RowRecord> {
        self.rows.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a RowRecord;
    type IntoIter = std::slice::Iter<'a, RowRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
