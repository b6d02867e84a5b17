//! Layout variants.
//!
//! A layout variant decides how rows are generated on the server and how the
//! grid is serialized back on the client. Every consumer matches on it
//! exhaustively.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutVariant {
    /// One row per catalogue code, rows fixed at render time.
    HorizontalStaticUnique,
    /// Rows added on demand, at most one row per code.
    HorizontalDynamicUnique,
    /// Rows added on demand, codes may repeat.
    HorizontalDynamicDuplicable,
    /// One row per column, a single object on the wire.
    VerticalStaticUnique,
    /// System table editor. Declared but not implemented.
    SystemDefinition,
}

impl LayoutVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutVariant::HorizontalStaticUnique => "HORIZONTAL_STATIC_UNIQUE",
            LayoutVariant::HorizontalDynamicUnique => "HORIZONTAL_DYNAMIC_UNIQUE",
            LayoutVariant::HorizontalDynamicDuplicable => "HORIZONTAL_DYNAMIC_DUPLICABLE",
            LayoutVariant::VerticalStaticUnique => "VERTICAL_STATIC_UNIQUE",
            LayoutVariant::SystemDefinition => "SYSTEM_DEFINITION",
        }
    }

    /// Horizontal layouts serialize to an array of row objects.
    pub fn is_horizontal(&self) -> bool {
        matches!(
            self,
            LayoutVariant::HorizontalStaticUnique
                | LayoutVariant::HorizontalDynamicUnique
                | LayoutVariant::HorizontalDynamicDuplicable
        )
    }

    /// Dynamic layouts let the user add and delete rows.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            LayoutVariant::HorizontalDynamicUnique | LayoutVariant::HorizontalDynamicDuplicable
        )
    }

    /// Whether a code may appear on at most one row.
    pub fn requires_unique_codes(&self) -> bool {
        matches!(self, LayoutVariant::HorizontalDynamicUnique)
    }
}

impl fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutVariant {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "HORIZONTAL_STATIC_UNIQUE" => Ok(LayoutVariant::HorizontalStaticUnique),
            "HORIZONTAL_DYNAMIC_UNIQUE" => Ok(LayoutVariant::HorizontalDynamicUnique),
            "HORIZONTAL_DYNAMIC_DUPLICABLE" => Ok(LayoutVariant::HorizontalDynamicDuplicable),
            "VERTICAL_STATIC_UNIQUE" => Ok(LayoutVariant::VerticalStaticUnique),
            "SYSTEM_DEFINITION" => Ok(LayoutVariant::SystemDefinition),
            _ => Err(ModelError::UnknownLayout(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        assert_eq!(
            "HORIZONTAL_STATIC_UNIQUE".parse::<LayoutVariant>().unwrap(),
            LayoutVariant::HorizontalStaticUnique
        );
        assert_eq!(
            "vertical_static_unique".parse::<LayoutVariant>().unwrap(),
            LayoutVariant::VerticalStaticUnique
        );
        assert!("PKD_STATIC_UNIQUE".parse::<LayoutVariant>().is_err());
    }

    #[test]
    fn capabilities() {
        assert!(LayoutVariant::HorizontalDynamicUnique.requires_unique_codes());
        assert!(!LayoutVariant::HorizontalDynamicDuplicable.requires_unique_codes());
        assert!(LayoutVariant::HorizontalDynamicDuplicable.is_dynamic());
        assert!(!LayoutVariant::VerticalStaticUnique.is_horizontal());
    }

    #[test]
    fn serializes_as_wire_name() {
        let json = serde_json::to_string(&LayoutVariant::HorizontalDynamicDuplicable).unwrap();
        assert_eq!(json, "\"HORIZONTAL_DYNAMIC_DUPLICABLE\"");
    }
}
