//! Cell model shared by the server-side resolver and the client runtime.

pub mod column;
pub mod error;
pub mod ids;
pub mod issue;
pub mod layout;
pub mod markup;
pub mod table;

pub use column::{
    CODE_DICTIONARY, CODE_SUFFIX, Column, DESCRIPTION_SUFFIX, EnumOption, FieldKind, is_code_name,
};
pub use error::{ModelError, Result};
pub use ids::{FarmId, RowIndex, SubtableId, SurveyKey, Year};
pub use issue::{Severity, ValidationIssue};
pub use layout::LayoutVariant;
pub use table::{Cell, CodeEntry, Row, TableDescription};
