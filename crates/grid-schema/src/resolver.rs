//! Table resolution.
//!
//! Joins subtable, column, code and block metadata into a
//! [`TableDescription`] with skeletal rows. Saved answers are merged later by
//! the populator.

use grid_model::{
    Cell, CodeEntry, Column, LayoutVariant, Row, RowIndex, SubtableId, TableDescription, Year,
};

use crate::error::{Result, SchemaError};
use crate::records::BlockRecord;
use crate::source::MetadataSource;

/// Resolve a subtable, logging any failure and returning an empty description.
pub fn resolve(source: &dyn MetadataSource, year: Year, subtable: &SubtableId) -> TableDescription {
    match try_resolve(source, year, subtable) {
        Ok(table) => table,
        Err(err) => {
            tracing::error!(year, %subtable, error = %err, "table resolution failed");
            TableDescription::empty()
        }
    }
}

pub fn try_resolve(
    source: &dyn MetadataSource,
    year: Year,
    subtable: &SubtableId,
) -> Result<TableDescription> {
    let record = source.subtable(year, subtable)?;
    let variant = record
        .variant()
        .map_err(|_| SchemaError::UnknownLayout {
            subtable: record.subtable.clone(),
            layout: record.layout.clone(),
        })?;

    let mut table = TableDescription::new(variant);
    table.subtable = Some(subtable.clone());
    table.name = record.display_name();

    match variant {
        LayoutVariant::HorizontalStaticUnique => {
            let columns = source.columns(year, subtable)?;
            let codes = source.codes(year, subtable)?;
            let blocks = source.blocks(year, subtable)?;
            table.rows = codes
                .iter()
                .map(|entry| code_row(&columns, entry, &blocks))
                .collect();
            table.columns = columns;
        }
        LayoutVariant::HorizontalDynamicUnique | LayoutVariant::HorizontalDynamicDuplicable => {
            table.columns = source.columns(year, subtable)?;
            table.catalogue = source.codes(year, subtable)?;
        }
        LayoutVariant::VerticalStaticUnique => {
            let columns = source.columns(year, subtable)?;
            table.rows = columns
                .iter()
                .enumerate()
                .map(|(index, column)| Row {
                    cells: vec![Cell::for_column(index, column)],
                    title: Some(column.row_title()),
                    code: None,
                    index: None,
                })
                .collect();
            table.columns = columns;
        }
        LayoutVariant::SystemDefinition => return Err(SchemaError::UnsupportedLayout(variant)),
    }

    tracing::debug!(
        year,
        %subtable,
        variant = %table.variant,
        columns = table.columns.len(),
        rows = table.rows.len(),
        "resolved table"
    );
    Ok(table)
}

/// One row per code for the static layout.
fn code_row(columns: &[Column], entry: &CodeEntry, blocks: &[BlockRecord]) -> Row {
    let cells = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let mut cell = Cell::for_column(index, column);
            cell.blocked = blocks
                .iter()
                .any(|block| block.code == entry.code && block.column == column.name);
            if column.is_code_column() {
                cell.editable = false;
                cell.value = entry.code.clone();
            }
            cell
        })
        .collect();
    Row {
        cells,
        title: Some(entry.title.clone()),
        code: Some(entry.code.clone()),
        index: None,
    }
}

/// Build a single row of a dynamic layout for `code`.
///
/// The code column is filled with the code, description columns with the
/// code's catalogue title. Both are read-only.
pub fn resolve_row(
    source: &dyn MetadataSource,
    year: Year,
    subtable: &SubtableId,
    code: &str,
    index: RowIndex,
) -> Result<Row> {
    let columns = source.columns(year, subtable)?;
    let blocks = source.blocks_for_code(year, subtable, code)?;
    let title = if columns.iter().any(Column::is_description_column) {
        source.code_title(year, code)?.unwrap_or_default()
    } else {
        String::new()
    };

    let cells = columns
        .iter()
        .enumerate()
        .map(|(position, column)| {
            let mut cell = Cell::for_column(position, column);
            cell.blocked = blocks.iter().any(|block| block.column == column.name);
            if column.is_code_column() {
                cell.editable = false;
                cell.value = code.to_string();
            }
            if column.is_description_column() {
                cell.editable = false;
                cell.value = title.clone();
            }
            cell
        })
        .collect();

    tracing::debug!(year, %subtable, code, %index, "resolved row");
    Ok(Row {
        cells,
        title: (!title.is_empty()).then_some(title),
        code: Some(code.to_string()),
        index: Some(index),
    })
}
