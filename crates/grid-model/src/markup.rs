//! Element classes and attribute names of the grid markup.
//!
//! The server writes these and the client runtime reads them back.

pub const GRID_CLASS: &str = "grid";
pub const OPTIONS_CLASS: &str = "options";
pub const CATALOGUE_CLASS: &str = "code-catalogue";

pub const ATTR_VARIANT: &str = "data-variant";
pub const ATTR_ENDPOINT: &str = "data-endpoint";
pub const ATTR_TITLE: &str = "data-title";
pub const ATTR_INITIAL: &str = "data-initial";

pub const ATTR_ROW_INDEX: &str = "data-row-index";
pub const ATTR_CODE: &str = "data-code";

pub const ATTR_NAME: &str = "name";
pub const ATTR_VALUE: &str = "value";
pub const ATTR_READONLY: &str = "readonly";
pub const ATTR_KIND: &str = "data-kind";
pub const ATTR_REQUIRED: &str = "data-required";
pub const ATTR_FORMAT: &str = "data-format";
pub const ATTR_MIN: &str = "data-min";
pub const ATTR_MAX: &str = "data-max";
pub const ATTR_ERROR_MESSAGE: &str = "data-error-message";
pub const ATTR_BLOCKED: &str = "data-blocked";

pub const ATTR_OPTION_VALUE: &str = "data-value";
pub const ATTR_OPTION_LABEL: &str = "data-label";
pub const ATTR_EXCLUSIVE: &str = "data-exclusive";

/// Boolean attributes are written as `"1"` when set.
pub const TRUE: &str = "1";
