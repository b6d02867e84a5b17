use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("not a number: {0:?}")]
    InvalidNumber(String),
}

pub type Result<T> = std::result::Result<T, FormatError>;
