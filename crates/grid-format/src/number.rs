//! Numeric display masks.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FormatError, Result};

const DIGIT_PLACEHOLDERS: [char; 3] = ['0', '#', '9'];
const NBSP: char = '\u{a0}';

static NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(\d+(,\d+)?|,\d+)$").expect("Invalid number regex"));

/// Grouping and precision derived from a display mask such as `# ##0,00`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberFormat {
    /// Group integer digits by three with a space.
    pub grouping: bool,
    /// Fraction digits shown.
    pub decimals: usize,
}

impl NumberFormat {
    pub fn new(grouping: bool, decimals: usize) -> Self {
        Self { grouping, decimals }
    }

    pub fn from_mask(mask: &str) -> Self {
        let grouping = mask.contains([' ', NBSP]);
        let decimals = match mask.rfind([',', '.']) {
            Some(pos) => mask[pos + 1..]
                .chars()
                .filter(|c| DIGIT_PLACEHOLDERS.contains(c))
                .count(),
            None => 0,
        };
        Self { grouping, decimals }
    }

    pub fn render(&self, value: f64) -> String {
        render_number(value, self)
    }

    /// Re-render raw text in this format, `None` if it does not parse.
    pub fn reformat(&self, text: &str) -> Option<String> {
        match parse_number(text) {
            Ok(Some(value)) => Some(self.render(value)),
            _ => None,
        }
    }
}

/// Render `value` with a comma separator and exactly `decimals` fraction digits.
///
/// Non-finite values render as an empty string.
pub fn render_number(value: f64, format: &NumberFormat) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let fixed = format!("{:.*}", format.decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + 4);
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    if format.grouping {
        out.push_str(&group_thousands(int_part));
    } else {
        out.push_str(int_part);
    }
    if let Some(frac_part) = frac_part {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Parse user text. Blank input is `Ok(None)`.
///
/// Grouping spaces are ignored and a period is accepted as the decimal
/// separator.
pub fn parse_number(text: &str) -> Result<Option<f64>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let compact: String = trimmed
        .chars()
        .filter(|c| *c != ' ' && *c != NBSP)
        .map(|c| if c == '.' { ',' } else { c })
        .collect();
    if !NUMBER_REGEX.is_match(&compact) {
        return Err(FormatError::InvalidNumber(text.to_string()));
    }
    compact
        .replace(',', ".")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| FormatError::InvalidNumber(text.to_string()))
}

/// Normalize text as it is typed into a numeric field.
///
/// Keeps a leading minus, digits and (when the format has decimals) the
/// first decimal separator, capping fraction digits.
pub fn normalize_number_input(text: &str, format: &NumberFormat) -> String {
    let mut out = String::with_capacity(text.len());
    let mut separator = false;
    let mut fraction = 0usize;
    for ch in text.chars() {
        match ch {
            '-' if out.is_empty() => out.push('-'),
            '0'..='9' if separator => {
                if fraction < format.decimals {
                    out.push(ch);
                    fraction += 1;
                }
            }
            '0'..='9' => out.push(ch),
            ',' | '.' if format.decimals > 0 && !separator => {
                separator = true;
                out.push(',');
            }
            _ => {}
        }
    }
    out
}
