use grid_model::{SurveyKey, TableDescription};

use crate::error::Result;
use crate::populator::populate;
use crate::resolver::try_resolve;
use crate::source::MetadataSource;
use crate::store::SurveyStore;

/// Resolve a table and merge the latest saved answers into it.
///
/// Store and payload problems are logged and the table is returned
/// unpopulated. Resolution errors are returned.
pub fn try_assemble(
    source: &dyn MetadataSource,
    store: &dyn SurveyStore,
    key: &SurveyKey,
    endpoint: &str,
) -> Result<TableDescription> {
    let mut table = try_resolve(source, key.year, &key.subtable)?;
    table.endpoint = endpoint.to_string();

    let payload = match store.load(key) {
        Ok(Some(stored)) => stored.payload,
        Ok(None) => String::new(),
        Err(err) => {
            tracing::warn!(%key, error = %err, "could not load survey data");
            String::new()
        }
    };

    if let Err(err) = populate(&mut table, &payload) {
        tracing::warn!(%key, variant = %table.variant, error = %err, "skipping malformed survey data");
    }
    table.data = payload;
    Ok(table)
}

/// Like [`try_assemble`] but a failed resolution yields an empty description.
pub fn assemble(
    source: &dyn MetadataSource,
    store: &dyn SurveyStore,
    key: &SurveyKey,
    endpoint: &str,
) -> TableDescription {
    match try_assemble(source, store, key, endpoint) {
        Ok(table) => table,
        Err(err) => {
            tracing::error!(%key, error = %err, "table resolution failed");
            TableDescription::empty()
        }
    }
}
