//! Field and row validation.

use grid_format::{parse_number, render_number};
use grid_model::ValidationIssue;

use crate::field::{Capability, Field};
use crate::rows::RowRecord;

const REQUIRED: &str = "This field is required";
const NOT_A_NUMBER: &str = "Enter a valid number";
const DASH_SHAPE: &str = "Enter digits in pairs separated by dashes, e.g. 12-34-56";
const CHOOSE_FROM_LIST: &str = "Choose a value from the list";
const UNCOMMITTED: &str = "Typed text is not a value from the list and will not be saved";
const SELECT_ONE: &str = "Select at least one option";

/// Validate one field. Blocked and read-only fields always pass.
pub fn validate_field(field: &Field) -> Option<ValidationIssue> {
    if !field.is_editable() {
        return None;
    }
    let spec = &field.spec;
    let name = spec.name.as_str();
    match field.capability {
        Capability::Number(format) => {
            let numeric_error = |message: String| {
                let message = spec.error_message.clone().unwrap_or(message);
                Some(ValidationIssue::error(name, message))
            };
            match parse_number(&field.text) {
                Ok(None) if spec.required => numeric_error(REQUIRED.to_string()),
                Ok(None) => None,
                Err(_) => numeric_error(NOT_A_NUMBER.to_string()),
                Ok(Some(value)) => {
                    if let Some(min) = spec.min
                        && value < min
                    {
                        return numeric_error(format!(
                            "Value must be at least {}",
                            render_number(min, &format)
                        ));
                    }
                    if let Some(max) = spec.max
                        && value > max
                    {
                        return numeric_error(format!(
                            "Value must be at most {}",
                            render_number(max, &format)
                        ));
                    }
                    None
                }
            }
        }
        Capability::Text(mask) => {
            let text = field.text.trim();
            if text.is_empty() {
                spec.required
                    .then(|| ValidationIssue::error(name, REQUIRED))
            } else if !mask.accepts(text) {
                Some(ValidationIssue::error(name, DASH_SHAPE))
            } else {
                None
            }
        }
        Capability::Choice => {
            let known = spec.options.iter().any(|o| o.value == field.committed);
            if !field.committed.is_empty() && known {
                None
            } else if spec.required || !field.committed.is_empty() {
                Some(ValidationIssue::error(name, CHOOSE_FROM_LIST))
            } else if !field.text.trim().is_empty() {
                Some(ValidationIssue::warning(name, UNCOMMITTED))
            } else {
                None
            }
        }
        Capability::MultiSelect | Capability::MultiExclusive => {
            (spec.required && !field.checked.contains(&true))
                .then(|| ValidationIssue::error(name, SELECT_ONE))
        }
        Capability::ReadOnly => None,
    }
}

/// Validate a row and record the issues on its fields.
///
/// A row without user data passes and has its markers cleared. Returns
/// whether the row is free of blocking issues.
pub fn validate_row(row: &mut RowRecord) -> bool {
    if !row.has_data() {
        row.clear_issues();
        return true;
    }
    let mut valid = true;
    for field in &mut row.fields {
        field.issue = validate_field(field);
        if field.issue.as_ref().is_some_and(ValidationIssue::is_blocking) {
            valid = false;
        }
    }
    valid
}

/// Blocking issues of a row without touching its markers.
pub fn row_errors(row: &RowRecord) -> Vec<ValidationIssue> {
    if !row.has_data() {
        return Vec::new();
    }
    row.fields
        .iter()
        .filter_map(validate_field)
        .filter(ValidationIssue::is_blocking)
        .collect()
}
