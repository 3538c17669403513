//! Reconciliation of desired records against a remote table.
//!
//! Converges a remote table towards a caller-supplied record set with the
//! fewest writes: rows whose key is unknown are inserted, rows whose cells
//! differ get a partial update, everything else is left alone. Nothing is
//! ever deleted by a sync.
//!
//! # Algorithm
//!
//! 1. Validate scope: non-empty key, every filter column is a key column
//! 2. Fetch current rows, keep those matching the filter
//! 3. Index current rows by composite key (duplicate keys are an error)
//! 4. For each in-scope desired record, in order: insert if unmatched,
//!    update only the differing columns if matched and changed
//! 5. Send inserts chunk by chunk, then updates grouped by shape and chunked

use crate::{
    batch::{chunk, group_by_shape, DEFAULT_BATCH_SIZE},
    filter,
    key::make_key,
    record::ID_COLUMN,
    CellValue, ColumnarTable, Error, FilterSpec, Record, Result, RowId, TableBackend,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use tracing::{debug, info, warn};

/// Knobs for a [`Reconciler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptions {
    /// Maximum rows per request payload
    pub batch_size: NonZeroUsize,
    /// Plan and log, but send no writes
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            dry_run: false,
        }
    }
}

/// Result of a sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// Records inserted (or that would be, on a dry run)
    pub num_added: usize,
    /// Records updated (or that would be, on a dry run)
    pub num_updated: usize,
    /// Ids assigned to inserted rows, in input order
    pub added_ids: Vec<RowId>,
}

/// How one desired record relates to the current table.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffOutcome {
    /// Matched a row and every specified cell is equal
    Unchanged,
    /// Matched row `id`; `changes` holds only the differing cells
    Changed { id: RowId, changes: Record },
    /// No row has this key
    Unmatched,
}

/// Classify `desired` against the row with the same key, if any.
///
/// Columns absent from `desired` are never changes, and `id` is never
/// compared.
pub fn diff(desired: &Record, current: Option<(RowId, &Record)>) -> DiffOutcome {
    let Some((id, current)) = current else {
        return DiffOutcome::Unmatched;
    };

    let changes: Record = desired
        .iter()
        .filter(|(column, value)| {
            column.as_str() != ID_COLUMN && current.get(column) != Some(*value)
        })
        .map(|(column, value)| (column.clone(), value.clone()))
        .collect();

    if changes.is_empty() {
        DiffOutcome::Unchanged
    } else {
        DiffOutcome::Changed { id, changes }
    }
}

/// Check that a key/filter pair defines a well-formed sync scope.
pub fn validate_scope<S: AsRef<str>>(key_columns: &[S], filter: Option<&FilterSpec>) -> Result<()> {
    if key_columns.is_empty() {
        return Err(Error::InvalidSyncScope(
            "at least one key column is required".into(),
        ));
    }
    if let Some(filter) = filter {
        for column in filter.columns() {
            if !key_columns.iter().any(|k| k.as_ref() == column) {
                return Err(Error::filter_outside_keys(column));
            }
        }
    }
    Ok(())
}

/// The writes a sync would perform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    /// Unmatched records, in input order
    pub inserts: Vec<Record>,
    /// Partial updates (`id` plus changed cells), in input order
    pub updates: Vec<Record>,
    /// Matched records with nothing to change
    pub unchanged: usize,
    /// Desired records excluded by the filter
    pub out_of_scope: usize,
}

impl SyncPlan {
    /// Diff `desired` against `current` without any IO.
    ///
    /// Every row in `current` must carry an integer `id`. Rows outside the
    /// filter are ignored.
    pub fn build<S: AsRef<str>>(
        current: Vec<Record>,
        desired: Vec<Record>,
        key_columns: &[S],
        filter: Option<&FilterSpec>,
    ) -> Result<Self> {
        validate_scope(key_columns, filter)?;

        let mut index: HashMap<String, (RowId, Record)> = HashMap::with_capacity(current.len());
        for (position, row) in current.into_iter().enumerate() {
            if !filter::matches(&row, filter) {
                continue;
            }
            let id = row.id().ok_or_else(|| {
                Error::MalformedTable(format!("current row at position {position} has no id"))
            })?;
            let key = make_key(&row, key_columns);
            if let Some((first, _)) = index.get(&key) {
                return Err(Error::KeyCollision {
                    key,
                    first: *first,
                    second: id,
                });
            }
            index.insert(key, (id, row));
        }

        let mut plan = SyncPlan::default();
        for record in desired {
            if !filter::matches(&record, filter) {
                plan.out_of_scope += 1;
                continue;
            }
            let current = index
                .get(&make_key(&record, key_columns))
                .map(|(id, row)| (*id, row));
            match diff(&record, current) {
                DiffOutcome::Unmatched => plan.inserts.push(record),
                DiffOutcome::Unchanged => plan.unchanged += 1,
                DiffOutcome::Changed { id, changes } => plan.updates.push(
                    std::iter::once((ID_COLUMN.to_string(), CellValue::Int(id)))
                        .chain(changes)
                        .collect(),
                ),
            }
        }
        Ok(plan)
    }

    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty()
    }
}

/// Drives syncs and bulk writes against a [`TableBackend`].
///
/// Calls are strictly sequential; the first failing call aborts the rest and
/// its error is returned. Writes already acknowledged stay applied.
///
/// Re-running a sync after a failure is safe for updates. Inserts carry no
/// idempotency key, so a chunk the server applied but reported as failed
/// is inserted again on retry.
pub struct Reconciler<'a, B: ?Sized> {
    backend: &'a B,
    options: SyncOptions,
}

impl<'a, B: TableBackend + ?Sized> Reconciler<'a, B> {
    /// Create a reconciler with default options.
    pub fn new(backend: &'a B) -> Self {
        Self::with_options(backend, SyncOptions::default())
    }

    pub fn with_options(backend: &'a B, options: SyncOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Fetch and decode the rows of `table` that match `filter`.
    pub async fn fetch_records(
        &self,
        table: &str,
        filter: Option<&FilterSpec>,
    ) -> Result<Vec<Record>> {
        let columnar = self
            .backend
            .fetch_rows(table, filter)
            .await
            .map_err(Error::Transport)?;
        let mut records = columnar.decode()?;
        records.retain(|r| filter::matches(r, filter));
        debug!(table, rows = records.len(), "fetched rows");
        Ok(records)
    }

    /// Converge `table` towards `desired`, matching rows on `key_columns`.
    ///
    /// With a filter, only rows and records matching it take part. Rows
    /// missing from `desired` are left untouched.
    pub async fn sync<S: AsRef<str>>(
        &self,
        table: &str,
        desired: Vec<Record>,
        key_columns: &[S],
        filter: Option<&FilterSpec>,
    ) -> Result<SyncResult> {
        validate_scope(key_columns, filter)?;

        let current = self.fetch_records(table, filter).await?;
        let plan = SyncPlan::build(current, desired, key_columns, filter)?;
        info!(
            table,
            inserts = plan.inserts.len(),
            updates = plan.updates.len(),
            unchanged = plan.unchanged,
            out_of_scope = plan.out_of_scope,
            dry_run = self.options.dry_run,
            "planned sync"
        );

        let num_added = plan.inserts.len();
        let num_updated = plan.updates.len();

        if self.options.dry_run {
            for record in &plan.inserts {
                info!(table, ?record, "dry run: would insert");
            }
            for record in &plan.updates {
                info!(table, ?record, "dry run: would update");
            }
            return Ok(SyncResult {
                num_added,
                num_updated,
                added_ids: Vec::new(),
            });
        }

        let added_ids = self.add_records(table, &plan.inserts).await?;
        self.send_updates(table, plan.updates).await?;

        Ok(SyncResult {
            num_added,
            num_updated,
            added_ids,
        })
    }

    /// Insert `records` in batches, returning the new row ids in order.
    pub async fn add_records(&self, table: &str, records: &[Record]) -> Result<Vec<RowId>> {
        let mut ids = Vec::with_capacity(records.len());
        for batch in chunk(records, self.options.batch_size) {
            debug!(table, rows = batch.len(), "inserting batch");
            let new_ids = self
                .backend
                .bulk_insert(table, ColumnarTable::encode(batch))
                .await
                .map_err(Error::Transport)?;
            if new_ids.len() != batch.len() {
                warn!(
                    table,
                    sent = batch.len(),
                    returned = new_ids.len(),
                    "insert returned an unexpected number of ids"
                );
            }
            ids.extend(new_ids);
        }
        Ok(ids)
    }

    /// Update rows by their numeric `id`.
    ///
    /// Every record needs an `id`; the check happens before any write.
    pub async fn update_records(&self, table: &str, records: Vec<Record>) -> Result<()> {
        if let Some(index) = records.iter().position(|r| r.id().is_none()) {
            return Err(Error::MissingIdentity { index });
        }
        self.send_updates(table, records).await
    }

    /// Delete rows by id, in batches.
    pub async fn delete_records(&self, table: &str, ids: &[RowId]) -> Result<()> {
        for batch in chunk(ids, self.options.batch_size) {
            debug!(table, rows = batch.len(), "deleting batch");
            self.backend
                .bulk_delete(table, batch.to_vec())
                .await
                .map_err(Error::Transport)?;
        }
        Ok(())
    }

    async fn send_updates(&self, table: &str, updates: Vec<Record>) -> Result<()> {
        for group in group_by_shape(updates) {
            for batch in chunk(&group, self.options.batch_size) {
                debug!(
                    table,
                    rows = batch.len(),
                    columns = batch[0].len(),
                    "updating batch"
                );
                self.backend
                    .bulk_update(table, ColumnarTable::encode(batch))
                    .await
                    .map_err(Error::Transport)?;
            }
        }
        Ok(())
    }
}
