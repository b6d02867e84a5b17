//! Parsing and rendering of cell display masks.
//!
//! Numbers are rendered with a comma decimal separator and optional space
//! grouping. Text masks made of digit placeholders and dashes constrain the
//! input to dash-grouped digit pairs. All functions are pure.

pub mod error;
pub mod mask;
pub mod number;
pub mod value;

pub use error::{FormatError, Result};
pub use mask::{TextMask, is_valid_dash_shape, normalize_dash_digits};
pub use number::{NumberFormat, normalize_number_input, parse_number, render_number};
pub use value::json_value_to_cell;
