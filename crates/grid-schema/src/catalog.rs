//! Metadata loaded from CSV files.
//!
//! The root directory holds one sub-directory per survey year (`2025/`, ...),
//! each with `subtables.csv`, `columns.csv`, `codes.csv`,
//! `subtable_codes.csv` and `blocks.csv`.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use grid_model::{CODE_DICTIONARY, CodeEntry, Column, Severity, SubtableId, Year};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SchemaError};
use crate::records::{BlockRecord, CodeRecord, ColumnRecord, SubtableCodeRecord, SubtableRecord};
use crate::source::MetadataSource;

pub const METADATA_ENV_VAR: &str = "GRID_METADATA_DIR";

const SUBTABLES_FILE: &str = "subtables.csv";
const COLUMNS_FILE: &str = "columns.csv";
const CODES_FILE: &str = "codes.csv";
const SUBTABLE_CODES_FILE: &str = "subtable_codes.csv";
const BLOCKS_FILE: &str = "blocks.csv";

pub fn default_metadata_root() -> PathBuf {
    if let Ok(root) = std::env::var(METADATA_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from("metadata")
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let csv_error = |source| SchemaError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(csv_error)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record.map_err(csv_error)?);
    }
    Ok(records)
}

/// Metadata of one survey year.
#[derive(Debug, Clone, Default)]
pub struct YearCatalog {
    pub subtables: Vec<SubtableRecord>,
    pub columns: Vec<ColumnRecord>,
    pub codes: BTreeMap<String, String>,
    pub subtable_codes: Vec<SubtableCodeRecord>,
    pub blocks: Vec<BlockRecord>,
}

impl YearCatalog {
    pub fn load(dir: &Path) -> Result<Self> {
        let mut subtables: Vec<SubtableRecord> = read_records(&dir.join(SUBTABLES_FILE))?;
        subtables.sort_by_key(|record| record.order);
        let mut columns: Vec<ColumnRecord> = read_records(&dir.join(COLUMNS_FILE))?;
        columns.sort_by_key(|record| record.order);
        let codes: Vec<CodeRecord> = read_records(&dir.join(CODES_FILE))?;
        let subtable_codes = read_records(&dir.join(SUBTABLE_CODES_FILE))?;
        let blocks = read_records(&dir.join(BLOCKS_FILE))?;
        Ok(Self {
            subtables,
            columns,
            codes: codes
                .into_iter()
                .map(|record| (record.code, record.title))
                .collect(),
            subtable_codes,
            blocks,
        })
    }

    fn find_subtable(&self, year: Year, id: &SubtableId) -> Result<&SubtableRecord> {
        self.subtables
            .iter()
            .find(|record| record.subtable == id.as_str())
            .ok_or_else(|| SchemaError::UnknownSubtable {
                year,
                subtable: id.to_string(),
            })
    }
}

/// A consistency problem found by [`CsvCatalog::check`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogIssue {
    pub year: Year,
    pub severity: Severity,
    /// Subtable, column or code the issue is about.
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct CsvCatalog {
    years: BTreeMap<Year, YearCatalog>,
}

impl CsvCatalog {
    /// Load every numeric sub-directory of `root` as a survey year.
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(SchemaError::MissingRoot(root.to_path_buf()));
        }
        let entries = fs::read_dir(root).map_err(|source| SchemaError::Io {
            operation: "list",
            path: root.to_path_buf(),
            source,
        })?;

        let mut years = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|source| SchemaError::Io {
                operation: "list",
                path: root.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(year) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.parse::<Year>().ok())
            else {
                continue;
            };
            let catalog = YearCatalog::load(&path)?;
            tracing::debug!(
                year,
                subtables = catalog.subtables.len(),
                columns = catalog.columns.len(),
                "loaded metadata year"
            );
            years.insert(year, catalog);
        }
        Ok(Self { years })
    }

    pub fn from_years(years: impl IntoIterator<Item = (Year, YearCatalog)>) -> Self {
        Self {
            years: years.into_iter().collect(),
        }
    }

    pub fn year(&self, year: Year) -> Result<&YearCatalog> {
        self.years.get(&year).ok_or(SchemaError::UnknownYear(year))
    }

    /// Report dangling references and unusable definitions.
    pub fn check(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        for (&year, catalog) in &self.years {
            check_year(year, catalog, &mut issues);
        }
        issues
    }
}

fn check_year(year: Year, catalog: &YearCatalog, issues: &mut Vec<CatalogIssue>) {
    let mut push = |severity, subject: &str, message: String| {
        issues.push(CatalogIssue {
            year,
            severity,
            subject: subject.to_string(),
            message,
        });
    };

    let subtables: HashSet<&str> = catalog
        .subtables
        .iter()
        .map(|record| record.subtable.as_str())
        .collect();

    for record in &catalog.subtables {
        if let Err(err) = record.variant() {
            push(Severity::Error, &record.subtable, err.to_string());
        }
        if SubtableId::new(record.subtable.as_str()).is_err() {
            push(
                Severity::Error,
                &record.subtable,
                "subtable identifier is not usable in a URL".to_string(),
            );
        }
    }

    let mut seen_columns = HashSet::new();
    for column in &catalog.columns {
        let subject = format!("{}.{}", column.subtable, column.name);
        if !subtables.contains(column.subtable.as_str()) {
            push(Severity::Error, &subject, "column of unknown subtable".to_string());
        }
        if !seen_columns.insert((column.subtable.as_str(), column.name.as_str())) {
            push(Severity::Error, &subject, "duplicate column".to_string());
        }
        if column.kind().has_options() {
            match column.dictionary() {
                Ok(Some(dictionary)) if dictionary.codes.len() != dictionary.labels.len() => push(
                    Severity::Warning,
                    &subject,
                    format!(
                        "dictionary has {} codes but {} labels",
                        dictionary.codes.len(),
                        dictionary.labels.len()
                    ),
                ),
                Ok(Some(_)) => {}
                Ok(None) => push(Severity::Warning, &subject, "option list is empty".to_string()),
                Err(err) => push(Severity::Error, &subject, format!("malformed dictionary: {err}")),
            }
        }
        if column.dictionary.as_deref() == Some(CODE_DICTIONARY) && column.dictionary_type.is_some() {
            push(
                Severity::Warning,
                &subject,
                "code dictionary column has a dictionary type".to_string(),
            );
        }
        if let (Some(min), Some(max)) = (column.min, column.max)
            && min > max
        {
            push(Severity::Error, &subject, format!("min {min} is above max {max}"));
        }
    }

    for link in &catalog.subtable_codes {
        if !subtables.contains(link.subtable.as_str()) {
            push(Severity::Error, &link.code, format!("code linked to unknown subtable {}", link.subtable));
        }
        if !catalog.codes.contains_key(&link.code) {
            push(Severity::Error, &link.code, format!("unknown code in subtable {}", link.subtable));
        }
    }

    for block in &catalog.blocks {
        let known = catalog
            .columns
            .iter()
            .any(|column| column.subtable == block.subtable && column.name == block.column);
        if !known {
            push(
                Severity::Warning,
                &format!("{}.{}", block.subtable, block.column),
                format!("block for code {} names an unknown column", block.code),
            );
        }
    }
}

impl MetadataSource for CsvCatalog {
    fn years(&self) -> Vec<Year> {
        self.years.keys().copied().collect()
    }

    fn subtables(&self, year: Year) -> Result<Vec<SubtableRecord>> {
        Ok(self.year(year)?.subtables.clone())
    }

    fn subtable(&self, year: Year, id: &SubtableId) -> Result<SubtableRecord> {
        self.year(year)?.find_subtable(year, id).cloned()
    }

    fn columns(&self, year: Year, id: &SubtableId) -> Result<Vec<Column>> {
        let catalog = self.year(year)?;
        catalog.find_subtable(year, id)?;
        Ok(catalog
            .columns
            .iter()
            .filter(|record| record.subtable == id.as_str())
            .map(ColumnRecord::to_column)
            .collect())
    }

    fn codes(&self, year: Year, id: &SubtableId) -> Result<Vec<CodeEntry>> {
        let catalog = self.year(year)?;
        catalog.find_subtable(year, id)?;
        let mut links: Vec<&SubtableCodeRecord> = catalog
            .subtable_codes
            .iter()
            .filter(|link| link.subtable == id.as_str())
            .collect();
        links.sort_by_key(|link| link.order.unwrap_or(i64::MAX));
        Ok(links
            .into_iter()
            .map(|link| {
                let title = catalog.codes.get(&link.code).cloned().unwrap_or_default();
                CodeEntry::new(link.code.clone(), title)
            })
            .collect())
    }

    fn blocks(&self, year: Year, id: &SubtableId) -> Result<Vec<BlockRecord>> {
        let catalog = self.year(year)?;
        Ok(catalog
            .blocks
            .iter()
            .filter(|block| block.subtable == id.as_str())
            .cloned()
            .collect())
    }

    fn code_title(&self, year: Year, code: &str) -> Result<Option<String>> {
        Ok(self.year(year)?.codes.get(code).cloned())
    }
}
