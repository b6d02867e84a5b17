//! Resolution of the fixture metadata year.

use std::path::PathBuf;

use grid_model::{FarmId, FieldKind, LayoutVariant, RowIndex, SubtableId, SurveyKey};
use grid_schema::{
    CsvCatalog, MemoryStore, MetadataSource, SchemaError, SurveyStore, assemble, resolve,
    resolve_row, try_resolve,
};
use serde::Serialize;

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/metadata")
}

fn catalog() -> CsvCatalog {
    CsvCatalog::load(&fixture_root()).expect("load fixture catalog")
}

fn id(subtable: &str) -> SubtableId {
    SubtableId::new(subtable).unwrap()
}

#[derive(Serialize)]
struct RowView<'a> {
    code: Option<&'a str>,
    values: Vec<&'a str>,
    blocked: Vec<&'a str>,
}

#[test]
fn static_layout_builds_one_row_per_code() {
    let catalog = catalog();
    let table = try_resolve(&catalog, 2025, &id("T01")).unwrap();

    assert_eq!(table.variant, LayoutVariant::HorizontalStaticUnique);
    assert_eq!(table.name, "1. Uprawy");
    assert_eq!(table.columns.len(), 4);
    assert_eq!(table.rows.len(), 3);

    let first = &table.rows[0];
    assert_eq!(first.code.as_deref(), Some("01"));
    assert_eq!(first.title.as_deref(), Some("Pszenica ozima"));
    let code_cell = first.cell("Wartosc_Kod").unwrap();
    assert!(!code_cell.editable);
    assert_eq!(code_cell.value, "01");
    assert!(first.cell("Wartosc_Liczba").unwrap().required);

    let blocked = table.rows[2].cell("Wartosc_Liczba").unwrap();
    assert!(blocked.blocked);
    assert!(!table.rows[0].cell("Wartosc_Liczba").unwrap().blocked);
}

#[test]
fn static_layout_snapshot_after_populating() {
    let catalog = catalog();
    let store = MemoryStore::new();
    let key = SurveyKey::new(2025, FarmId::new("100200").unwrap(), id("T01"));
    store
        .replace(
            &key,
            r#"[{"Wartosc_Kod":"01","Wartosc_Liczba":12.5},{"Wartosc_Kod":"03","Wartosc_Uwagi":"odlogi","Wartosc_Liczba":4.0}]"#,
        )
        .unwrap();

    let table = assemble(&catalog, &store, &key, "/endpoint/");
    assert_eq!(table.endpoint, "/endpoint/");
    assert!(table.data.starts_with("[{"));

    let rows: Vec<RowView<'_>> = table
        .rows
        .iter()
        .map(|row| RowView {
            code: row.code.as_deref(),
            values: row.cells.iter().map(|cell| cell.value.as_str()).collect(),
            blocked: row
                .cells
                .iter()
                .filter(|cell| cell.blocked)
                .map(|cell| cell.name.as_str())
                .collect(),
        })
        .collect();

    insta::assert_json_snapshot!(rows, @r#"
    [
      {
        "code": "01",
        "values": [
          "01",
          "",
          "12.5",
          ""
        ],
        "blocked": []
      },
      {
        "code": "02",
        "values": [
          "02",
          "",
          "",
          ""
        ],
        "blocked": []
      },
      {
        "code": "03",
        "values": [
          "03",
          "",
          "4",
          "odlogi"
        ],
        "blocked": [
          "Wartosc_Liczba"
        ]
      }
    ]
    "#);
}

#[test]
fn dynamic_layouts_return_catalogue_without_rows() {
    let catalog = catalog();
    let unique = try_resolve(&catalog, 2025, &id("T02")).unwrap();
    assert_eq!(unique.variant, LayoutVariant::HorizontalDynamicUnique);
    assert!(unique.rows.is_empty());
    let codes: Vec<&str> = unique.catalogue.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, ["10", "11"]);

    let rasa = unique.column("Zwierzeta_Rasa").unwrap();
    assert_eq!(rasa.kind, FieldKind::Choice);
    assert_eq!(rasa.options.len(), 2);

    let duplicable = try_resolve(&catalog, 2025, &id("T03")).unwrap();
    assert_eq!(duplicable.variant, LayoutVariant::HorizontalDynamicDuplicable);
    assert_eq!(duplicable.catalogue.len(), 2);
    assert_eq!(
        duplicable.column("Maszyny_Rok").unwrap().error_message.as_deref(),
        Some("Rok produkcji spoza zakresu")
    );
}

#[test]
fn dynamic_payload_is_carried_through() {
    let catalog = catalog();
    let store = MemoryStore::new();
    let key = SurveyKey::new(2025, FarmId::new("100200").unwrap(), id("T02"));
    let payload = r#"[{"Zwierzeta_Kod":"10","Zwierzeta_Sztuki":4}]"#;
    store.replace(&key, payload).unwrap();

    let table = assemble(&catalog, &store, &key, "/t02/");
    assert!(table.rows.is_empty());
    assert_eq!(table.data, payload);
}

#[test]
fn vertical_layout_builds_one_row_per_column() {
    let catalog = catalog();
    let table = try_resolve(&catalog, 2025, &id("T04")).unwrap();
    assert_eq!(table.variant, LayoutVariant::VerticalStaticUnique);
    assert_eq!(table.rows.len(), table.columns.len());

    let first = &table.rows[0];
    assert_eq!(first.title.as_deref(), Some("1. Powierzchnia gospodarstwa"));
    assert_eq!(first.cells.len(), 1);
    assert_eq!(first.cells[0].name, "Powierzchnia");
    assert!(first.cells[0].required);

    let insurance = table.column("Ubezpieczenie").unwrap();
    assert_eq!(insurance.kind, FieldKind::MultiExclusive);
    let exclusive: Vec<&str> = insurance
        .options
        .iter()
        .filter(|o| o.exclusive)
        .map(|o| o.value.as_str())
        .collect();
    assert_eq!(exclusive, ["X"]);
}

#[test]
fn vertical_malformed_payload_leaves_cells_empty() {
    let catalog = catalog();
    let store = MemoryStore::new();
    let key = SurveyKey::new(2025, FarmId::new("100200").unwrap(), id("T04"));
    store.replace(&key, "[not json").unwrap();

    let table = assemble(&catalog, &store, &key, "/t04/");
    assert!(!table.is_empty());
    assert!(table.rows.iter().all(|row| row.cells[0].value.is_empty()));
    assert_eq!(table.data, "[not json");
}

#[test]
fn row_resolution_fills_code_and_description() {
    let catalog = catalog();
    let row = resolve_row(&catalog, 2025, &id("T02"), "11", RowIndex(4)).unwrap();

    assert_eq!(row.index, Some(RowIndex(4)));
    assert_eq!(row.code.as_deref(), Some("11"));
    let code = row.cell("Zwierzeta_Kod").unwrap();
    assert_eq!(code.value, "11");
    assert!(!code.editable);
    assert_eq!(
        row.cell("Zwierzeta_Wyszczegolnienie").unwrap().value,
        "Trzoda chlewna"
    );
    assert!(row.cell("Zwierzeta_Rasa").unwrap().blocked);
    assert!(!row.cell("Zwierzeta_Sztuki").unwrap().blocked);
}

#[test]
fn failures_yield_empty_description() {
    let catalog = catalog();
    assert!(resolve(&catalog, 2025, &id("T05")).is_empty());
    assert!(resolve(&catalog, 2025, &id("T06")).is_empty());
    assert!(resolve(&catalog, 2025, &id("T99")).is_empty());
    assert!(resolve(&catalog, 1999, &id("T01")).is_empty());

    assert!(matches!(
        try_resolve(&catalog, 2025, &id("T05")),
        Err(SchemaError::UnsupportedLayout(LayoutVariant::SystemDefinition))
    ));
    assert!(matches!(
        try_resolve(&catalog, 2025, &id("T06")),
        Err(SchemaError::UnknownLayout { .. })
    ));
    let missing = try_resolve(&catalog, 1999, &id("T01")).unwrap_err();
    assert!(missing.is_not_found());
}

#[test]
fn catalog_lists_years_and_subtables() {
    let catalog = catalog();
    assert_eq!(catalog.years(), vec![2025]);
    let subtables = catalog.subtables(2025).unwrap();
    assert_eq!(subtables.len(), 6);
    assert_eq!(subtables[0].subtable, "T01");
}
