//! Rows of the metadata tables.
//!
//! One struct per CSV file of a metadata year. Columns are turned into the
//! model's [`Column`] by [`ColumnRecord::to_column`].

use grid_model::{Column, EnumOption, FieldKind, LayoutVariant, ModelError};
use serde::{Deserialize, Serialize};

/// `subtables.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtableRecord {
    pub subtable: String,
    pub table: String,
    pub symbol: String,
    pub title: String,
    /// Layout variant wire name.
    pub layout: String,
    pub order: i64,
}

impl SubtableRecord {
    pub fn variant(&self) -> Result<LayoutVariant, ModelError> {
        self.layout.parse()
    }

    /// Heading shown above the grid.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.symbol, self.title).trim().to_string()
    }
}

/// `columns.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRecord {
    pub subtable: String,
    pub name: String,
    pub title: String,
    pub label: String,
    pub unit: Option<String>,
    pub data_type: String,
    pub format: Option<String>,
    pub required: u8,
    pub visible: u8,
    pub width: u32,
    pub formula: Option<String>,
    pub regex: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub order: i64,
    /// Dictionary name. `Kody` is the code catalogue, not an option list.
    pub dictionary: Option<String>,
    /// Dictionary contents as JSON, see [`Dictionary`].
    pub dictionary_values: Option<String>,
    /// `P`, `M` or `MW`.
    pub dictionary_type: Option<String>,
    pub error_message: Option<String>,
    pub tooltip: Option<String>,
}

impl ColumnRecord {
    pub fn kind(&self) -> FieldKind {
        FieldKind::from_metadata(
            &self.data_type,
            self.dictionary.as_deref(),
            self.dictionary_type.as_deref(),
        )
    }

    pub fn dictionary(&self) -> Result<Option<Dictionary>, serde_json::Error> {
        match self.dictionary_values.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw).map(Some),
            _ => Ok(None),
        }
    }

    /// Build the model column. A malformed dictionary yields no options.
    pub fn to_column(&self) -> Column {
        let kind = self.kind();
        let options = if kind.has_options() {
            match self.dictionary() {
                Ok(Some(dictionary)) => dictionary.options(),
                Ok(None) => Vec::new(),
                Err(err) => {
                    tracing::warn!(
                        subtable = %self.subtable,
                        column = %self.name,
                        error = %err,
                        "malformed dictionary values"
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Column {
            name: self.name.clone(),
            title: self.title.clone(),
            label: self.label.clone(),
            tooltip: self.tooltip.clone(),
            unit: self.unit.clone().unwrap_or_default(),
            kind,
            format: self.format.clone().unwrap_or_default(),
            required: self.required != 0,
            visible: self.visible != 0,
            width: self.width,
            formula: self.formula.clone(),
            regex: self.regex.clone(),
            min: self.min,
            max: self.max,
            order: self.order,
            options,
            primary_key: false,
            error_message: self.error_message.clone(),
        }
    }
}

/// Option list stored with a column, e.g.
/// `{"Kod":["1","9"],"Opis":["Tak","Nie dotyczy"],"Wykluczajace":["9"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    #[serde(rename = "Kod", default)]
    pub codes: Vec<String>,
    #[serde(rename = "Opis", default)]
    pub labels: Vec<String>,
    #[serde(rename = "Wykluczajace", default)]
    pub exclusive: Vec<String>,
}

impl Dictionary {
    pub fn options(&self) -> Vec<EnumOption> {
        self.codes
            .iter()
            .enumerate()
            .map(|(i, code)| EnumOption {
                value: code.clone(),
                label: self.labels.get(i).cloned().unwrap_or_default(),
                exclusive: self.exclusive.contains(code),
            })
            .collect()
    }
}

/// `codes.csv`, the global code catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    pub code: String,
    pub title: String,
}

/// `subtable_codes.csv`, codes valid in a subtable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtableCodeRecord {
    pub subtable: String,
    pub code: String,
    pub order: Option<i64>,
}

/// `blocks.csv`, a column that may not be edited for a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub subtable: String,
    pub column: String,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(data_type: &str) -> ColumnRecord {
        ColumnRecord {
            subtable: "T01".into(),
            name: "Pole".into(),
            title: "Pole".into(),
            label: "1".into(),
            unit: None,
            data_type: data_type.into(),
            format: None,
            required: 1,
            visible: 1,
            width: 80,
            formula: None,
            regex: None,
            min: None,
            max: None,
            order: 1,
            dictionary: None,
            dictionary_values: None,
            dictionary_type: None,
            error_message: None,
            tooltip: None,
        }
    }

    #[test]
    fn exclusive_options_from_dictionary() {
        let mut rec = record("string");
        rec.dictionary = Some("Ubezpieczenia".into());
        rec.dictionary_type = Some("MW".into());
        rec.dictionary_values = Some(
            r#"{"Kod":["A","B","X"],"Opis":["Budynki","Uprawy","Brak"],"Wykluczajace":["X"]}"#
                .into(),
        );
        let column = rec.to_column();
        assert_eq!(column.kind, FieldKind::MultiExclusive);
        assert_eq!(column.options.len(), 3);
        assert!(column.options[2].exclusive);
        assert!(!column.options[0].exclusive);
        assert!(column.required);
    }

    #[test]
    fn code_dictionary_is_not_an_option_list() {
        let mut rec = record("string");
        rec.dictionary = Some("Kody".into());
        rec.dictionary_values = Some(r#"{"Kod":["01"],"Opis":["Pszenica"]}"#.into());
        let column = rec.to_column();
        assert_eq!(column.kind, FieldKind::Text);
        assert!(column.options.is_empty());
    }

    #[test]
    fn malformed_dictionary_yields_no_options() {
        let mut rec = record("string");
        rec.dictionary = Some("Rasy".into());
        rec.dictionary_values = Some("{not json".into());
        let column = rec.to_column();
        assert_eq!(column.kind, FieldKind::Choice);
        assert!(column.options.is_empty());
    }

    #[test]
    fn short_label_list_leaves_blank_labels() {
        let dictionary = Dictionary {
            codes: vec!["1".into(), "2".into()],
            labels: vec!["Jeden".into()],
            exclusive: Vec::new(),
        };
        let options = dictionary.options();
        assert_eq!(options[1].label, "");
    }
}
