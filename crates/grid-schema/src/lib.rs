//! Server-side assembly of survey grid descriptions.
//!
//! Metadata (subtables, columns, codes and blocks) comes from a
//! [`MetadataSource`]; previously saved answers come from a [`SurveyStore`].
//! The resolver joins metadata into a [`TableDescription`] and the populator
//! merges saved answers into its cells.

pub mod assemble;
pub mod catalog;
pub mod error;
pub mod populator;
pub mod records;
pub mod resolver;
pub mod source;
pub mod store;

pub use assemble::{assemble, try_assemble};
pub use catalog::{CatalogIssue, CsvCatalog, METADATA_ENV_VAR, default_metadata_root};
pub use error::{PopulateError, Result, SchemaError, StoreError};
pub use populator::{populate, populate_from_array, populate_from_object};
pub use records::{BlockRecord, CodeRecord, ColumnRecord, Dictionary, SubtableCodeRecord, SubtableRecord};
pub use resolver::{resolve, resolve_row, try_resolve};
pub use source::MetadataSource;
pub use store::{FileStore, MemoryStore, StoredSurvey, SurveyStore};

pub use grid_model::TableDescription;
