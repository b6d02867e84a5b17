//! Column metadata and field kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix marking the column that carries a row's code.
pub const CODE_SUFFIX: &str = "_Kod";

/// Suffix marking the column pre-filled with the code's catalogue title.
pub const DESCRIPTION_SUFFIX: &str = "_Wyszczegolnienie";

/// Name of the global code dictionary. Columns bound to it are not enums.
pub const CODE_DICTIONARY: &str = "Kody";

/// Returns true if the name carries a row code.
pub fn is_code_name(name: &str) -> bool {
    name.ends_with(CODE_SUFFIX)
}

/// Capability tag of an input, decided once when the column is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Number,
    Text,
    /// Single pick from the option catalogue.
    Choice,
    /// Checkbox group, any number of options.
    MultiSelect,
    /// Checkbox group with one option excluding all others.
    MultiExclusive,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::Text => "text",
            FieldKind::Choice => "choice",
            FieldKind::MultiSelect => "multi",
            FieldKind::MultiExclusive => "multi_exclusive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "number" => Some(FieldKind::Number),
            "text" => Some(FieldKind::Text),
            "choice" => Some(FieldKind::Choice),
            "multi" => Some(FieldKind::MultiSelect),
            "multi_exclusive" => Some(FieldKind::MultiExclusive),
            _ => None,
        }
    }

    /// Kinds backed by an option catalogue.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            FieldKind::Choice | FieldKind::MultiSelect | FieldKind::MultiExclusive
        )
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, FieldKind::MultiSelect | FieldKind::MultiExclusive)
    }

    /// Derive the kind from the metadata columns `data_type`, `dictionary`
    /// and `dictionary_type`.
    ///
    /// A dictionary type always wins. A dictionary other than the global code
    /// dictionary without a type is a single choice.
    pub fn from_metadata(
        data_type: &str,
        dictionary: Option<&str>,
        dictionary_type: Option<&str>,
    ) -> Self {
        if let Some(kind) = dictionary_type.map(str::trim).filter(|s| !s.is_empty()) {
            return match kind.to_uppercase().as_str() {
                "M" => FieldKind::MultiSelect,
                "MW" => FieldKind::MultiExclusive,
                _ => FieldKind::Choice,
            };
        }
        if let Some(dictionary) = dictionary.map(str::trim).filter(|s| !s.is_empty())
            && dictionary != CODE_DICTIONARY
        {
            return FieldKind::Choice;
        }
        match data_type.trim().to_lowercase().as_str() {
            "int" | "integer" | "float" | "number" | "numeric" | "decimal" => FieldKind::Number,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an enumerated value set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    pub value: String,
    pub label: String,
    /// Checking this option clears every other option of a multi-exclusive group.
    #[serde(default)]
    pub exclusive: bool,
}

impl EnumOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            exclusive: false,
        }
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Text the selector filters on.
    pub fn search_text(&self) -> String {
        format!("{} - {}", self.value, self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Wire key of the field.
    pub name: String,
    pub title: String,
    /// Short symbol shown in headers.
    pub label: String,
    pub tooltip: Option<String>,
    /// Unit of measure label.
    pub unit: String,
    pub kind: FieldKind,
    /// Display format mask.
    pub format: String,
    pub required: bool,
    pub visible: bool,
    pub width: u32,
    pub formula: Option<String>,
    pub regex: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub order: i64,
    #[serde(default)]
    pub options: Vec<EnumOption>,
    /// Only set for system tables.
    #[serde(default)]
    pub primary_key: bool,
    /// Replaces the default message of numeric errors.
    pub error_message: Option<String>,
}

impl Column {
    /// A visible, optional text column with no format.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            label: String::new(),
            tooltip: None,
            unit: String::new(),
            kind,
            format: String::new(),
            required: false,
            visible: true,
            width: 0,
            formula: None,
            regex: None,
            min: None,
            max: None,
            order: 0,
            options: Vec::new(),
            primary_key: false,
            error_message: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_options(mut self, options: Vec<EnumOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn is_code_column(&self) -> bool {
        is_code_name(&self.name)
    }

    pub fn is_description_column(&self) -> bool {
        self.name.ends_with(DESCRIPTION_SUFFIX)
    }

    /// Row title used by the vertical layout.
    pub fn row_title(&self) -> String {
        format!("{} {}", self.label, self.title).trim().to_string()
    }
}
