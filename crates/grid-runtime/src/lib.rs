//! Client-side runtime for survey grids.
//!
//! A [`Grid`] is attached to the markup written by the server, routes user
//! events to fields by their [`Capability`], validates rows and saves the
//! serialized grid through a [`Transport`].

pub mod clock;
pub mod error;
pub mod field;
pub mod gateway;
pub mod grid;
pub mod markup;
pub mod options;
pub mod rows;
pub mod selector;
pub mod toast;
pub mod transport;
pub mod validate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AddRowError, GatewayError, MarkupError, RuntimeError, TransportError};
pub use field::{Capability, Field, FieldSpec};
pub use gateway::{check_save_reply, field_wire_value, serialize};
pub use grid::{Grid, GridEvent, GridState, SaveOutcome, SaveRejection, SaveTicket};
pub use markup::{FieldMarkup, GridMarkup, RowMarkup, parse_grid, parse_row_fragment};
pub use options::RuntimeOptions;
pub use rows::{RowRecord, RowSet};
pub use selector::{FieldId, NavKey, SelectorId, SelectorItem, SelectorOutcome, SelectorState};
pub use toast::{Toast, ToastKind};
pub use transport::{HttpTransport, Request, Response, ScriptedTransport, Transport};
pub use validate::{row_errors, validate_field, validate_row};
