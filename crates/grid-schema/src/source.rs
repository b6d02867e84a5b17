use grid_model::{Column, CodeEntry, SubtableId, Year};

use crate::error::Result;
use crate::records::{BlockRecord, SubtableRecord};

/// Read access to per-year survey metadata.
pub trait MetadataSource: Send + Sync {
    /// Years with metadata, ascending.
    fn years(&self) -> Vec<Year>;

    /// Subtables of a year, in display order.
    fn subtables(&self, year: Year) -> Result<Vec<SubtableRecord>>;

    fn subtable(&self, year: Year, id: &SubtableId) -> Result<SubtableRecord>;

    /// Columns of a subtable, in display order.
    fn columns(&self, year: Year, id: &SubtableId) -> Result<Vec<Column>>;

    /// Code catalogue of a subtable, in display order.
    fn codes(&self, year: Year, id: &SubtableId) -> Result<Vec<CodeEntry>>;

    fn blocks(&self, year: Year, id: &SubtableId) -> Result<Vec<BlockRecord>>;

    fn blocks_for_code(&self, year: Year, id: &SubtableId, code: &str) -> Result<Vec<BlockRecord>> {
        Ok(self
            .blocks(year, id)?
            .into_iter()
            .filter(|block| block.code == code)
            .collect())
    }

    /// Title of a code in the global catalogue.
    fn code_title(&self, year: Year, code: &str) -> Result<Option<String>>;
}
