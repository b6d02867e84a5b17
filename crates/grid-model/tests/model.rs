//! Tests for grid-model types.

use grid_model::{
    Cell, Column, EnumOption, FieldKind, LayoutVariant, Row, Severity, TableDescription,
    ValidationIssue,
};

#[test]
fn issue_severity_blocks_only_errors() {
    let issues = [
        ValidationIssue::error("Liczba", "Pole wymagane"),
        ValidationIssue::warning("Uprawa", "Nie wybrano wartości"),
    ];
    let blocking = issues.iter().filter(|issue| issue.is_blocking()).count();
    assert_eq!(blocking, 1);
    assert!(Severity::Error > Severity::Warning);
}

#[test]
fn description_serializes() {
    let mut table = TableDescription::new(LayoutVariant::VerticalStaticUnique);
    let column = Column::new("Uprawa", FieldKind::Choice).with_options(vec![
        EnumOption::new("1", "Pszenica"),
        EnumOption::new("9", "Brak").exclusive(),
    ]);
    table.rows.push(Row {
        cells: vec![Cell::for_column(0, &column)],
        title: Some(column.row_title()),
        ..Row::default()
    });
    table.columns.push(column);

    let json = serde_json::to_string(&table).expect("serialize description");
    let round: TableDescription = serde_json::from_str(&json).expect("deserialize description");
    assert_eq!(round.variant, LayoutVariant::VerticalStaticUnique);
    assert_eq!(round.columns[0].options.len(), 2);
    assert!(round.columns[0].options[1].exclusive);
    assert_eq!(round.rows[0].cell("Uprawa").map(|c| c.column), Some(0));
}

#[test]
fn option_search_text() {
    let option = EnumOption::new("01", "Pszenica ozima");
    assert_eq!(option.search_text(), "01 - Pszenica ozima");
}
