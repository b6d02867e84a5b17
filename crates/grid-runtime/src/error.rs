//! Runtime error types.

use grid_model::{LayoutVariant, RowIndex};
use thiserror::Error;

/// The request never produced a response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid request: {0}")]
    Request(String),
}

/// A save or row fetch that did not succeed.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-2xx response.
    #[error("server responded with status {status}")]
    Server { status: u16, message: Option<String> },

    /// 2xx response whose body does not acknowledge the save.
    #[error("server did not confirm the save: {0}")]
    Unconfirmed(String),

    #[error(transparent)]
    Markup(#[from] MarkupError),
}

impl GatewayError {
    /// Toast text for this failure.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Transport(err) => format!("Connection failed: {err}"),
            GatewayError::Server {
                status,
                message: Some(message),
            } => format!("Server error ({status}): {message}"),
            GatewayError::Server {
                status,
                message: None,
            } => format!("Server error ({status})"),
            GatewayError::Unconfirmed(message) => format!("Save not confirmed: {message}"),
            GatewayError::Markup(err) => format!("Could not read the server response: {err}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed markup: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(String),

    #[error("missing grid root element")]
    MissingRoot,

    #[error("no row in fragment")]
    MissingRow,

    #[error("invalid {attribute} value {value:?}")]
    InvalidValue { attribute: &'static str, value: String },
}

/// Why a dynamic row was not added.
#[derive(Debug, Error)]
pub enum AddRowError {
    #[error("rows cannot be added to this table")]
    NotExtensible,

    #[error("code {0} is not in the catalogue")]
    UnknownCode(String),

    #[error("code {0} already has a row")]
    DuplicateCode(String),

    #[error(transparent)]
    Fetch(#[from] GatewayError),
}

impl AddRowError {
    pub fn user_message(&self) -> String {
        match self {
            AddRowError::Fetch(err) => format!("Could not add the row. {}", err.user_message()),
            other => format!("Could not add the row: {other}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("layout {0} has no grid runtime")]
    UnsupportedLayout(LayoutVariant),

    #[error("no row with index {0}")]
    UnknownRow(RowIndex),

    #[error("row {row} has no field {name}")]
    UnknownField { row: RowIndex, name: String },

    #[error(transparent)]
    Markup(#[from] MarkupError),
}
