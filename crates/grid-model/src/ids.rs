//! Identifiers used to address survey data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Survey year. Metadata and data are partitioned by year.
pub type Year = u16;

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 64
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Identifier of a subtable within a survey year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtableId(String);

impl SubtableId {
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        if is_identifier(&id) {
            Ok(Self(id))
        } else {
            Err(ModelError::InvalidSubtableId(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubtableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SubtableId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

/// Identifier of the surveyed farm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FarmId(String);

impl FarmId {
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        if is_identifier(&id) {
            Ok(Self(id))
        } else {
            Err(ModelError::InvalidFarmId(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FarmId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

/// Index distinguishing rows added at runtime. Never reused within a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowIndex(pub u64);

impl RowIndex {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RowIndex {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ModelError::InvalidRowIndex(s.to_string()))
    }
}

/// Identity of one persisted survey blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurveyKey {
    pub year: Year,
    pub farm: FarmId,
    pub subtable: SubtableId,
}

impl SurveyKey {
    pub fn new(year: Year, farm: FarmId, subtable: SubtableId) -> Self {
        Self {
            year,
            farm,
            subtable,
        }
    }
}

impl fmt::Display for SurveyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.year, self.farm, self.subtable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_characters() {
        assert!(SubtableId::new("T_01").is_ok());
        assert!(SubtableId::new("../etc").is_err());
        assert!(SubtableId::new("").is_err());
        assert!(FarmId::new("a/b").is_err());
    }

    #[test]
    fn row_index_parsing() {
        assert_eq!("7".parse::<RowIndex>().unwrap(), RowIndex(7));
        assert!("x1".parse::<RowIndex>().is_err());
        assert_eq!(RowIndex(7).next(), RowIndex(8));
    }

    #[test]
    fn survey_key_display() {
        let key = SurveyKey::new(
            2025,
            FarmId::new("100200").unwrap(),
            SubtableId::new("T01").unwrap(),
        );
        assert_eq!(key.to_string(), "2025/100200/T01");
    }
}
