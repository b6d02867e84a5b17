//! Merge persisted answers into resolved rows.

use std::collections::HashMap;

use grid_format::json_value_to_cell;
use grid_model::{LayoutVariant, Row, TableDescription, is_code_name};
use serde_json::{Map, Value};

use crate::error::PopulateError;

type Object = Map<String, Value>;

/// Fill the rows of a static or vertical table from `payload`.
///
/// Dynamic layouts are left untouched; the client provisions their rows.
pub fn populate(table: &mut TableDescription, payload: &str) -> Result<(), PopulateError> {
    match table.variant {
        LayoutVariant::HorizontalStaticUnique => populate_from_array(&mut table.rows, payload),
        LayoutVariant::VerticalStaticUnique => populate_from_object(&mut table.rows, payload),
        LayoutVariant::HorizontalDynamicUnique
        | LayoutVariant::HorizontalDynamicDuplicable
        | LayoutVariant::SystemDefinition => Ok(()),
    }
}

/// The code an object is keyed by: the value of its first `_Kod` key, if a string.
fn object_code(object: &Object) -> Option<&str> {
    object
        .iter()
        .find(|(key, _)| is_code_name(key))
        .and_then(|(_, value)| value.as_str())
}

/// Horizontal payload: an array of objects matched to rows by code.
pub fn populate_from_array(rows: &mut [Row], payload: &str) -> Result<(), PopulateError> {
    if payload.trim().is_empty() {
        return Ok(());
    }
    let objects: Vec<Object> = serde_json::from_str(payload)?;

    let mut by_code: HashMap<&str, &Object> = HashMap::new();
    for object in &objects {
        if let Some(code) = object_code(object) {
            by_code.insert(code, object);
        }
    }

    for row in rows.iter_mut() {
        let Some(object) = row.code.as_deref().and_then(|code| by_code.get(code)) else {
            continue;
        };
        fill_cells(row, object);
    }
    Ok(())
}

/// Vertical payload: a single object keyed by column name.
pub fn populate_from_object(rows: &mut [Row], payload: &str) -> Result<(), PopulateError> {
    if payload.trim().is_empty() {
        return Ok(());
    }
    let object: Object = serde_json::from_str(payload)?;
    for row in rows.iter_mut() {
        fill_cells(row, &object);
    }
    Ok(())
}

fn fill_cells(row: &mut Row, object: &Object) {
    for cell in &mut row.cells {
        if let Some(value) = object.get(&cell.name) {
            cell.value = json_value_to_cell(value);
        }
    }
}
