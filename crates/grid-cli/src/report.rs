//! Terminal tables for catalog listings and resolved descriptions.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use grid_format::NumberFormat;
use grid_model::{Column, FieldKind, Severity, TableDescription};
use grid_schema::{CatalogIssue, SubtableRecord};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

pub fn subtables_table(records: &[SubtableRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Subtable"),
        header_cell("Table"),
        header_cell("Title"),
        header_cell("Layout"),
    ]);
    apply_table_style(&mut table);
    for record in records {
        let layout = match record.variant() {
            Ok(variant) => Cell::new(variant),
            Err(_) => Cell::new(&record.layout).fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(&record.subtable),
            Cell::new(&record.table),
            Cell::new(record.display_name()),
            layout,
        ]);
    }
    table
}

/// Value as the grid would show it.
pub fn display_value(column: &Column, value: &str) -> String {
    match column.kind {
        FieldKind::Number => NumberFormat::from_mask(&column.format)
            .reformat(value)
            .unwrap_or_else(|| value.to_string()),
        FieldKind::Text | FieldKind::Choice | FieldKind::MultiSelect | FieldKind::MultiExclusive => {
            value.to_string()
        }
    }
}

/// One line per row, one column per visible field. Blocked cells show `×`.
pub fn description_table(description: &TableDescription) -> Table {
    let visible: Vec<usize> = description
        .columns
        .iter()
        .enumerate()
        .filter(|(_, column)| column.visible)
        .map(|(index, _)| index)
        .collect();

    let mut table = Table::new();
    let mut header = vec![header_cell("Row")];
    if description.variant.is_horizontal() {
        header.extend(
            visible
                .iter()
                .map(|&index| header_cell(&description.columns[index].name)),
        );
    } else {
        header.push(header_cell("Value"));
    }
    table.set_header(header);
    apply_table_style(&mut table);

    for (position, row) in description.rows.iter().enumerate() {
        let title = row
            .title
            .clone()
            .or_else(|| row.code.clone())
            .unwrap_or_else(|| position.to_string());
        let mut line = vec![Cell::new(title)];
        for cell in &row.cells {
            if !visible.contains(&cell.column) {
                continue;
            }
            let Some(column) = description.columns.get(cell.column) else {
                continue;
            };
            line.push(if cell.blocked {
                Cell::new("×").fg(Color::DarkGrey)
            } else {
                Cell::new(display_value(column, &cell.value))
            });
        }
        table.add_row(line);
    }
    table
}

pub fn issues_table(issues: &[CatalogIssue]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Year"),
        header_cell("Severity"),
        header_cell("Subject"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    for issue in issues {
        let color = match issue.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };
        table.add_row(vec![
            Cell::new(issue.year),
            Cell::new(issue.severity).fg(color),
            Cell::new(&issue.subject),
            Cell::new(&issue.message),
        ]);
    }
    table
}

pub fn error_count(issues: &[CatalogIssue]) -> usize {
    issues
        .iter()
        .filter(|issue| issue.severity.is_blocking())
        .count()
}
