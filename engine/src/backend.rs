//! Capabilities the reconciler needs from a remote table store.

use crate::{ColumnarTable, FilterSpec, RowId, TransportError};
use async_trait::async_trait;

/// Read and write access to the tables of one remote document.
///
/// Implementations own transport, credentials and URL layout. The engine
/// issues at most one call at a time and never retries.
#[async_trait]
pub trait TableBackend: Send + Sync {
    /// Fetch the rows of `table`.
    ///
    /// The filter may be applied remotely or ignored; the reconciler filters
    /// the result again either way.
    async fn fetch_rows(
        &self,
        table: &str,
        filter: Option<&FilterSpec>,
    ) -> Result<ColumnarTable, TransportError>;

    /// Insert rows, returning new row ids in payload row order.
    async fn bulk_insert(
        &self,
        table: &str,
        rows: ColumnarTable,
    ) -> Result<Vec<RowId>, TransportError>;

    /// Update rows identified by the payload's `id` column.
    async fn bulk_update(&self, table: &str, rows: ColumnarTable) -> Result<(), TransportError>;

    /// Delete rows by id.
    async fn bulk_delete(&self, table: &str, ids: Vec<RowId>) -> Result<(), TransportError>;
}
