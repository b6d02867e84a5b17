//! Reading the server-rendered grid markup.
//!
//! Only attributes carry data; element text is ignored. See
//! [`grid_model::markup`] for the names.

use std::collections::HashMap;

use grid_model::markup::{
    ATTR_BLOCKED, ATTR_CODE, ATTR_ENDPOINT, ATTR_ERROR_MESSAGE, ATTR_EXCLUSIVE, ATTR_FORMAT,
    ATTR_INITIAL, ATTR_KIND, ATTR_MAX, ATTR_MIN, ATTR_NAME, ATTR_OPTION_LABEL, ATTR_OPTION_VALUE,
    ATTR_READONLY, ATTR_REQUIRED, ATTR_ROW_INDEX, ATTR_TITLE, ATTR_VALUE, ATTR_VARIANT,
    CATALOGUE_CLASS, GRID_CLASS, OPTIONS_CLASS,
};
use grid_model::{CodeEntry, EnumOption, FieldKind, LayoutVariant, RowIndex};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::MarkupError;
use crate::field::FieldSpec;

#[derive(Debug, Clone, PartialEq)]
pub struct GridMarkup {
    pub variant: LayoutVariant,
    pub endpoint: String,
    pub title: String,
    /// Saved payload for dynamic layouts, verbatim.
    pub initial: Option<String>,
    pub rows: Vec<RowMarkup>,
    pub catalogue: Vec<CodeEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowMarkup {
    pub index: Option<RowIndex>,
    pub code: Option<String>,
    pub title: Option<String>,
    pub fields: Vec<FieldMarkup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMarkup {
    pub spec: FieldSpec,
    pub value: String,
}

type Attributes = HashMap<String, String>;

fn read_attributes(element: &BytesStart<'_>) -> Result<Attributes, MarkupError> {
    let mut attributes = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|err| MarkupError::Attribute(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = std::str::from_utf8(&attr.value)
            .map_err(|err| MarkupError::Attribute(err.to_string()))?;
        let value = quick_xml::escape::unescape(raw)
            .map_err(|err| MarkupError::Attribute(err.to_string()))?
            .into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}

fn has_class(attributes: &Attributes, class: &str) -> bool {
    attributes
        .get("class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

fn flag(attributes: &Attributes, name: &str) -> bool {
    attributes
        .get(name)
        .is_some_and(|value| matches!(value.as_str(), "1" | "true" | "readonly"))
}

fn non_empty(attributes: &Attributes, name: &str) -> Option<String> {
    attributes
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn bound(attributes: &Attributes, name: &'static str) -> Result<Option<f64>, MarkupError> {
    match non_empty(attributes, name) {
        None => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| MarkupError::InvalidValue {
                attribute: name,
                value,
            }),
    }
}

fn field_markup(attributes: &Attributes) -> Result<FieldMarkup, MarkupError> {
    let name = attributes.get(ATTR_NAME).cloned().unwrap_or_default();
    let raw_kind = attributes.get(ATTR_KIND).map(String::as_str).unwrap_or_default();
    let kind = FieldKind::parse(raw_kind).ok_or_else(|| MarkupError::InvalidValue {
        attribute: ATTR_KIND,
        value: raw_kind.to_string(),
    })?;
    let spec = FieldSpec {
        name,
        kind,
        read_only: attributes.contains_key(ATTR_READONLY),
        required: flag(attributes, ATTR_REQUIRED),
        blocked: flag(attributes, ATTR_BLOCKED),
        format: attributes.get(ATTR_FORMAT).cloned().unwrap_or_default(),
        min: bound(attributes, ATTR_MIN)?,
        max: bound(attributes, ATTR_MAX)?,
        error_message: non_empty(attributes, ATTR_ERROR_MESSAGE),
        options: Vec::new(),
    };
    Ok(FieldMarkup {
        spec,
        value: attributes.get(ATTR_VALUE).cloned().unwrap_or_default(),
    })
}

fn row_markup(attributes: &Attributes) -> Result<RowMarkup, MarkupError> {
    let index = match non_empty(attributes, ATTR_ROW_INDEX) {
        Some(raw) => Some(raw.parse::<RowIndex>().map_err(|_| MarkupError::InvalidValue {
            attribute: ATTR_ROW_INDEX,
            value: raw,
        })?),
        None => None,
    };
    Ok(RowMarkup {
        index,
        code: non_empty(attributes, ATTR_CODE),
        title: non_empty(attributes, ATTR_TITLE),
        fields: Vec::new(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum List {
    None,
    Options,
    Catalogue,
}

struct Header {
    variant: LayoutVariant,
    endpoint: String,
    title: String,
    initial: Option<String>,
}

struct Parser {
    header: Option<Header>,
    rows: Vec<RowMarkup>,
    current: Option<RowMarkup>,
    catalogue: Vec<CodeEntry>,
    list: List,
}

impl Parser {
    fn new() -> Self {
        Self {
            header: None,
            rows: Vec::new(),
            current: None,
            catalogue: Vec::new(),
            list: List::None,
        }
    }

    fn run(mut self, markup: &str) -> Result<Self, MarkupError> {
        let mut reader = Reader::from_str(markup);
        reader.config_mut().trim_text(true);
        loop {
            match reader.read_event()? {
                Event::Start(element) => self.open(&element, false)?,
                Event::Empty(element) => self.open(&element, true)?,
                Event::End(element) => self.close(element.name().as_ref()),
                Event::Eof => break,
                _ => {}
            }
        }
        if let Some(row) = self.current.take() {
            self.rows.push(row);
        }
        Ok(self)
    }

    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<(), MarkupError> {
        let attributes = read_attributes(element)?;
        match element.name().as_ref() {
            b"tr" => {
                if let Some(row) = self.current.take() {
                    self.rows.push(row);
                }
                let row = row_markup(&attributes)?;
                if empty {
                    self.rows.push(row);
                } else {
                    self.current = Some(row);
                }
            }
            b"input" if attributes.contains_key(ATTR_KIND) => {
                let field = field_markup(&attributes)?;
                if let Some(row) = self.current.as_mut() {
                    row.fields.push(field);
                }
            }
            b"ul" if has_class(&attributes, OPTIONS_CLASS) => {
                self.list = if empty { List::None } else { List::Options };
            }
            b"ul" if has_class(&attributes, CATALOGUE_CLASS) => {
                self.list = if empty { List::None } else { List::Catalogue };
            }
            b"li" => match self.list {
                List::Options => {
                    let option = EnumOption {
                        value: attributes.get(ATTR_OPTION_VALUE).cloned().unwrap_or_default(),
                        label: attributes.get(ATTR_OPTION_LABEL).cloned().unwrap_or_default(),
                        exclusive: flag(&attributes, ATTR_EXCLUSIVE),
                    };
                    if let Some(field) = self
                        .current
                        .as_mut()
                        .and_then(|row| row.fields.last_mut())
                    {
                        field.spec.options.push(option);
                    }
                }
                List::Catalogue => self.catalogue.push(CodeEntry::new(
                    attributes.get(ATTR_CODE).cloned().unwrap_or_default(),
                    attributes.get(ATTR_TITLE).cloned().unwrap_or_default(),
                )),
                List::None => {}
            },
            _ if has_class(&attributes, GRID_CLASS) && self.header.is_none() => {
                let raw = attributes.get(ATTR_VARIANT).cloned().unwrap_or_default();
                let variant = raw.parse::<LayoutVariant>().map_err(|_| MarkupError::InvalidValue {
                    attribute: ATTR_VARIANT,
                    value: raw,
                })?;
                self.header = Some(Header {
                    variant,
                    endpoint: attributes.get(ATTR_ENDPOINT).cloned().unwrap_or_default(),
                    title: attributes.get(ATTR_TITLE).cloned().unwrap_or_default(),
                    initial: non_empty(&attributes, ATTR_INITIAL),
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"tr" => {
                if let Some(row) = self.current.take() {
                    self.rows.push(row);
                }
            }
            b"ul" => self.list = List::None,
            _ => {}
        }
    }
}

/// Parse a full grid.
pub fn parse_grid(markup: &str) -> Result<GridMarkup, MarkupError> {
    let parser = Parser::new().run(markup)?;
    let header = parser.header.ok_or(MarkupError::MissingRoot)?;
    Ok(GridMarkup {
        variant: header.variant,
        endpoint: header.endpoint,
        title: header.title,
        initial: header.initial,
        rows: parser
            .rows
            .into_iter()
            .filter(|row| !row.fields.is_empty())
            .collect(),
        catalogue: parser.catalogue,
    })
}

/// Parse the fragment returned for one dynamic row.
pub fn parse_row_fragment(markup: &str) -> Result<RowMarkup, MarkupError> {
    let parser = Parser::new().run(markup)?;
    parser
        .rows
        .into_iter()
        .find(|row| !row.fields.is_empty())
        .ok_or(MarkupError::MissingRow)
}
