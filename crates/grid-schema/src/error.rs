//! Error types for metadata loading, resolution and storage.

use std::path::PathBuf;

use grid_model::{LayoutVariant, Year};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("no metadata for year {0}")]
    UnknownYear(Year),

    #[error("unknown subtable {subtable} in year {year}")]
    UnknownSubtable { year: Year, subtable: String },

    #[error("subtable {subtable} declares unknown layout {layout:?}")]
    UnknownLayout { subtable: String, layout: String },

    #[error("layout {0} is not supported")]
    UnsupportedLayout(LayoutVariant),

    #[error("no metadata directory at {0}")]
    MissingRoot(PathBuf),

    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl SchemaError {
    /// True for lookups that name something the catalog does not have.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SchemaError::UnknownYear(_) | SchemaError::UnknownSubtable { .. }
        )
    }
}

/// Persisted payload could not be merged into the description.
#[derive(Debug, Error)]
pub enum PopulateError {
    #[error("malformed survey payload")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move {temp_path} into place at {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt survey document")]
    Serialization(#[from] serde_json::Error),

    #[error("survey store lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// Message safe to show to the person who triggered the save.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Io { operation, .. } => format!("Could not {operation} the survey data"),
            StoreError::AtomicWriteFailed { .. } => {
                "Could not save the survey data. Check disk space and permissions.".to_string()
            }
            StoreError::Serialization(_) => "The stored survey data is corrupt".to_string(),
            StoreError::Poisoned => "The survey store is unavailable".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
