//! Field descriptors and live field state.

use grid_format::{NumberFormat, TextMask, normalize_number_input};
use grid_model::{Cell, Column, EnumOption, FieldKind, ValidationIssue};

/// What an input can do, decided once when the field is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Number(NumberFormat),
    Text(TextMask),
    Choice,
    MultiSelect,
    MultiExclusive,
    ReadOnly,
}

impl Capability {
    pub fn is_enum(&self) -> bool {
        matches!(
            self,
            Capability::Choice | Capability::MultiSelect | Capability::MultiExclusive
        )
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Capability::MultiSelect | Capability::MultiExclusive)
    }
}

/// The per-field contract delivered with the markup.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub read_only: bool,
    pub required: bool,
    pub blocked: bool,
    pub format: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub error_message: Option<String>,
    pub options: Vec<EnumOption>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            read_only: false,
            required: false,
            blocked: false,
            format: String::new(),
            min: None,
            max: None,
            error_message: None,
            options: Vec::new(),
        }
    }

    pub fn from_cell(column: &Column, cell: &Cell) -> Self {
        Self {
            name: cell.name.clone(),
            kind: column.kind,
            read_only: !cell.editable,
            required: cell.required,
            blocked: cell.blocked,
            format: column.format.clone(),
            min: column.min,
            max: column.max,
            error_message: column.error_message.clone(),
            options: column.options.clone(),
        }
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

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn blocked(mut self) -> Self {
        self.blocked = true;
        self
    }

    fn capability(&self) -> Capability {
        if self.read_only {
            return Capability::ReadOnly;
        }
        match self.kind {
            FieldKind::Number => Capability::Number(NumberFormat::from_mask(&self.format)),
            FieldKind::Text => Capability::Text(TextMask::from_mask(&self.format)),
            FieldKind::Choice => Capability::Choice,
            FieldKind::MultiSelect => Capability::MultiSelect,
            FieldKind::MultiExclusive => Capability::MultiExclusive,
        }
    }
}

/// One live input of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub spec: FieldSpec,
    pub capability: Capability,
    /// Visible text. For a choice this is the label or the typed filter.
    pub text: String,
    /// Catalogue value committed to a choice.
    pub committed: String,
    /// Checked state of each option of a checkbox group.
    pub checked: Vec<bool>,
    pub disabled: Vec<bool>,
    pub issue: Option<ValidationIssue>,
}

impl Field {
    pub fn new(spec: FieldSpec, initial: &str) -> Self {
        let capability = spec.capability();
        let options = spec.options.len();
        let mut field = Self {
            spec,
            capability,
            text: String::new(),
            committed: String::new(),
            checked: vec![false; options],
            disabled: vec![false; options],
            issue: None,
        };
        field.set_value(initial);
        field
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Replace the value as if it had been loaded from saved data.
    pub fn set_value(&mut self, raw: &str) {
        match self.capability {
            Capability::Number(format) => {
                self.text = format.reformat(raw).unwrap_or_else(|| raw.to_string());
            }
            Capability::Text(_) | Capability::ReadOnly => self.text = raw.to_string(),
            Capability::Choice => {
                let raw = raw.trim();
                match self.spec.options.iter().find(|option| option.value == raw) {
                    Some(option) => {
                        self.committed = option.value.clone();
                        self.text = option.label.clone();
                    }
                    None => {
                        self.committed.clear();
                        self.text = raw.to_string();
                    }
                }
            }
            Capability::MultiSelect | Capability::MultiExclusive => {
                let values: Vec<&str> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .collect();
                for (i, option) in self.spec.options.iter().enumerate() {
                    self.checked[i] = values.contains(&option.value.as_str());
                }
                self.disabled.fill(false);
                if self.capability == Capability::MultiExclusive {
                    let exclusive = self.exclusive_checked();
                    if exclusive {
                        for (i, option) in self.spec.options.iter().enumerate() {
                            if !option.exclusive {
                                self.checked[i] = false;
                                self.disabled[i] = true;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Value as it is serialized: the committed value of a choice, the
    /// comma-joined checked values of a group, the text otherwise.
    pub fn value(&self) -> String {
        match self.capability {
            Capability::Choice => self.committed.clone(),
            Capability::MultiSelect | Capability::MultiExclusive => self
                .spec
                .options
                .iter()
                .zip(&self.checked)
                .filter(|(_, checked)| **checked)
                .map(|(option, _)| option.value.as_str())
                .collect::<Vec<_>>()
                .join(","),
            Capability::Number(_) | Capability::Text(_) | Capability::ReadOnly => {
                self.text.clone()
            }
        }
    }

    pub fn is_editable(&self) -> bool {
        self.capability != Capability::ReadOnly && !self.spec.blocked
    }

    /// Whether the user has put anything into this input.
    pub fn has_user_data(&self) -> bool {
        if !self.is_editable() {
            return false;
        }
        match self.capability {
            Capability::Choice => !self.committed.is_empty() || !self.text.trim().is_empty(),
            Capability::MultiSelect | Capability::MultiExclusive => self.checked.contains(&true),
            Capability::Number(_) | Capability::Text(_) => !self.text.trim().is_empty(),
            Capability::ReadOnly => false,
        }
    }

    /// Apply a keystroke's worth of input.
    pub fn input(&mut self, text: &str) {
        match self.capability {
            Capability::Number(format) => self.text = normalize_number_input(text, &format),
            Capability::Text(mask) => self.text = mask.normalize(text),
            Capability::Choice => {
                self.text = text.to_string();
                self.committed.clear();
            }
            Capability::MultiSelect | Capability::MultiExclusive | Capability::ReadOnly => {}
        }
    }

    /// Re-render a parsable number in the display format.
    pub fn blur(&mut self) {
        if let Capability::Number(format) = self.capability
            && let Some(rendered) = format.reformat(&self.text)
        {
            self.text = rendered;
        }
    }

    /// Commit a catalogue value to a choice. Unknown values are ignored.
    pub fn pick(&mut self, value: &str) -> bool {
        if self.capability != Capability::Choice {
            return false;
        }
        match self.spec.options.iter().find(|option| option.value == value) {
            Some(option) => {
                self.committed = option.value.clone();
                self.text = option.label.clone();
                true
            }
            None => false,
        }
    }

    /// Check or uncheck one option of a checkbox group.
    ///
    /// Checking the exclusive option clears and disables the others;
    /// checking a regular option clears the exclusive one.
    pub fn toggle(&mut self, value: &str, checked: bool) -> bool {
        if !self.capability.is_multi() {
            return false;
        }
        let Some(position) = self.spec.options.iter().position(|o| o.value == value) else {
            return false;
        };
        if self.disabled[position] {
            return false;
        }
        self.checked[position] = checked;

        if self.capability != Capability::MultiExclusive {
            return true;
        }
        let exclusive = self.spec.options[position].exclusive;
        for (i, option) in self.spec.options.iter().enumerate() {
            if i == position {
                continue;
            }
            match (exclusive, checked, option.exclusive) {
                (true, true, false) => {
                    self.checked[i] = false;
                    self.disabled[i] = true;
                }
                (true, false, false) => self.disabled[i] = false,
                (false, true, true) => self.checked[i] = false,
                _ => {}
            }
        }
        true
    }

    fn exclusive_checked(&self) -> bool {
        self.spec
            .options
            .iter()
            .zip(&self.checked)
            .any(|(option, checked)| option.exclusive && *checked)
    }
}
