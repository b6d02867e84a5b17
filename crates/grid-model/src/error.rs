use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown layout variant: {0}")]
    UnknownLayout(String),
    #[error("invalid subtable identifier: {0:?}")]
    InvalidSubtableId(String),
    #[error("invalid farm identifier: {0:?}")]
    InvalidFarmId(String),
    #[error("invalid row index: {0:?}")]
    InvalidRowIndex(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
