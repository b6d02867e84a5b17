//! Loading and checking CSV metadata on disk.

use std::fs;
use std::path::Path;

use grid_model::{Severity, SubtableId};
use grid_schema::{CsvCatalog, MetadataSource, SchemaError};

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn write_year(root: &Path, year: &str, columns: &str) {
    let dir = root.join(year);
    write(
        &dir.join("subtables.csv"),
        "subtable,table,symbol,title,layout,order\nS1,A,1.,Dane,HORIZONTAL_STATIC_UNIQUE,1\nS2,A,2.,Inne,horizontal_static_unique,2\n",
    );
    write(&dir.join("columns.csv"), columns);
    write(&dir.join("codes.csv"), "code,title\n01,Pierwszy\n");
    write(
        &dir.join("subtable_codes.csv"),
        "subtable,code,order\nS1,01,1\nS1,77,2\n",
    );
    write(&dir.join("blocks.csv"), "subtable,column,code\nS1,Brak,01\n");
}

const HEADER: &str = "subtable,name,title,label,unit,data_type,format,required,visible,width,formula,regex,min,max,order,dictionary,dictionary_values,dictionary_type,error_message,tooltip\n";

#[test]
fn loads_numeric_directories_only() {
    let dir = tempfile::tempdir().unwrap();
    let columns = format!("{HEADER}S1,A_Kod,Kod,a,,string,$,0,1,60,,,,,1,,,,,\n");
    write_year(dir.path(), "2024", &columns);
    write_year(dir.path(), "2025", &columns);
    write(&dir.path().join("notes/readme.txt"), "ignored");

    let catalog = CsvCatalog::load(dir.path()).unwrap();
    assert_eq!(catalog.years(), vec![2024, 2025]);

    let s1 = SubtableId::new("S1").unwrap();
    let codes = catalog.codes(2025, &s1).unwrap();
    assert_eq!(codes.len(), 2);
    assert_eq!(codes[1].title, "");
    assert_eq!(catalog.code_title(2025, "01").unwrap().as_deref(), Some("Pierwszy"));
    assert!(matches!(
        catalog.columns(2023, &s1),
        Err(SchemaError::UnknownYear(2023))
    ));
}

#[test]
fn check_reports_dangling_references() {
    let dir = tempfile::tempdir().unwrap();
    let columns = format!(
        "{HEADER}S1,A_Kod,Kod,a,,string,$,0,1,60,,,,,1,,,,,\n\
         S9,Sierota,Sierota,b,,int,###0,0,1,60,,,5,1,2,,,,,\n\
         S1,Wybor,Wybór,c,,string,,0,1,60,,,,,3,Slownik,{{bad,P,,\n"
    );
    write_year(dir.path(), "2025", &columns);

    let catalog = CsvCatalog::load(dir.path()).unwrap();
    let issues = catalog.check();
    let messages: Vec<String> = issues
        .iter()
        .map(|issue| format!("{} {}", issue.subject, issue.message))
        .collect();

    assert!(messages.iter().any(|m| m == "S9.Sierota column of unknown subtable"));
    assert!(messages.iter().any(|m| m == "S9.Sierota min 5 is above max 1"));
    assert!(messages.iter().any(|m| m.starts_with("S1.Wybor malformed dictionary")));
    assert!(messages.iter().any(|m| m == "77 unknown code in subtable S1"));
    assert!(messages.iter().any(|m| m.starts_with("S1.Brak block for code 01")));
    assert!(issues.iter().all(|issue| issue.year == 2025));
    assert!(issues.iter().any(|issue| issue.severity == Severity::Warning));
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CsvCatalog::load(&dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, SchemaError::MissingRoot(_)));
}

#[test]
fn fixture_catalog_has_one_unknown_layout() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/metadata");
    let catalog = CsvCatalog::load(&root).unwrap();
    let issues = catalog.check();
    assert_eq!(issues.len(), 1, "{issues:?}");
    assert_eq!(issues[0].subject, "T06");
    assert_eq!(issues[0].severity, Severity::Error);
}
