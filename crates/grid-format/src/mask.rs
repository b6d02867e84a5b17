//! Text masks.

use std::sync::LazyLock;

use regex::Regex;

/// Raw digits kept by a dash-grouped mask.
pub const MAX_DASH_DIGITS: usize = 8;

/// Mask value that disables pattern checking.
pub const UNTYPED_MASK: &str = "$";

static DASH_SHAPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d|\d{2}(-\d{2}){0,3})$").expect("Invalid dash shape regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMask {
    /// Any text is accepted.
    Untyped,
    /// Digit pairs separated by dashes, e.g. `12-34-56`.
    DashGrouped,
}

impl TextMask {
    pub fn from_mask(mask: &str) -> Self {
        let mask = mask.trim();
        if mask.is_empty() || mask == UNTYPED_MASK {
            return TextMask::Untyped;
        }
        let only_placeholders = mask
            .chars()
            .all(|c| matches!(c, '0' | '#' | '9' | '-'));
        if only_placeholders && mask.contains('-') {
            TextMask::DashGrouped
        } else {
            TextMask::Untyped
        }
    }

    /// Normalize typed text for this mask.
    pub fn normalize(&self, text: &str) -> String {
        match self {
            TextMask::Untyped => text.to_string(),
            TextMask::DashGrouped => normalize_dash_digits(text),
        }
    }

    /// Whether non-blank text satisfies the mask.
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            TextMask::Untyped => true,
            TextMask::DashGrouped => is_valid_dash_shape(text.trim()),
        }
    }
}

/// Keep up to eight digits and insert a dash after every pair.
pub fn normalize_dash_digits(text: &str) -> String {
    let digits: Vec<char> = text
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DASH_DIGITS)
        .collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && i % 2 == 0 {
            out.push('-');
        }
        out.push(*digit);
    }
    out
}

/// Accepts `d`, `dd`, `dd-dd`, `dd-dd-dd` and `dd-dd-dd-dd`.
pub fn is_valid_dash_shape(text: &str) -> bool {
    DASH_SHAPE_REGEX.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_masks() {
        assert_eq!(TextMask::from_mask("$"), TextMask::Untyped);
        assert_eq!(TextMask::from_mask(""), TextMask::Untyped);
        assert_eq!(TextMask::from_mask("00-00-00"), TextMask::DashGrouped);
        assert_eq!(TextMask::from_mask("99-99"), TextMask::DashGrouped);
        assert_eq!(TextMask::from_mask("0000"), TextMask::Untyped);
        assert_eq!(TextMask::from_mask("AA-00"), TextMask::Untyped);
    }

    #[test]
    fn groups_digits_in_pairs() {
        assert_eq!(normalize_dash_digits("1234567"), "12-34-56-7");
        assert_eq!(normalize_dash_digits("12"), "12");
        assert_eq!(normalize_dash_digits("12-3x4"), "12-34");
        assert_eq!(normalize_dash_digits("1234567890"), "12-34-56-78");
        assert_eq!(normalize_dash_digits("abc"), "");
    }

    #[test]
    fn dash_shape_whitelist() {
        for ok in ["1", "12", "12-34", "12-34-56", "12-34-56-78"] {
            assert!(is_valid_dash_shape(ok), "{ok}");
        }
        for bad in ["", "123", "1-23", "12-3", "12-34-56-7", "12-34-56-78-90"] {
            assert!(!is_valid_dash_shape(bad), "{bad}");
        }
    }

    #[test]
    fn untyped_accepts_anything() {
        assert!(TextMask::Untyped.accepts("anything at all"));
        assert!(!TextMask::DashGrouped.accepts("12-3"));
    }
}
