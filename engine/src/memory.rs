//! In-memory [`TableBackend`] for tests, benchmarks and local dry runs.
//!
//! Behaves like a small remote store: rows get sequential ids on insert,
//! fetched tables carry every column (cells a row never set read as `null`),
//! and every call is logged so tests can assert on the exact traffic.

use crate::{
    record::ID_COLUMN, CellValue, ColumnarTable, FilterSpec, Record, RowId, TableBackend,
    TransportError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One call received by a [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Fetch {
        table: String,
        filter: Option<FilterSpec>,
    },
    Insert {
        table: String,
        rows: ColumnarTable,
    },
    Update {
        table: String,
        rows: ColumnarTable,
    },
    Delete {
        table: String,
        ids: Vec<RowId>,
    },
}

impl BackendCall {
    pub fn is_write(&self) -> bool {
        !matches!(self, BackendCall::Fetch { .. })
    }
}

#[derive(Debug, Default)]
struct MemoryTable {
    last_id: RowId,
    rows: Vec<Record>,
}

impl MemoryTable {
    fn insert(&mut self, record: Record) -> RowId {
        self.last_id += 1;
        let id = self.last_id;
        let row = std::iter::once((ID_COLUMN.to_string(), CellValue::Int(id)))
            .chain(record.into_iter().filter(|(column, _)| column != ID_COLUMN))
            .collect();
        self.rows.push(row);
        id
    }
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, MemoryTable>,
    calls: Vec<BackendCall>,
    writes: usize,
    fail_after_writes: Option<usize>,
}

/// A table store held in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
    filter_remotely: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table seeded with `records`; ids are assigned in order from 1.
    pub fn with_table(self, table: impl Into<String>, records: Vec<Record>) -> Self {
        {
            let mut state = self.lock();
            let entry = state.tables.entry(table.into()).or_default();
            for record in records {
                entry.insert(record);
            }
        }
        self
    }

    /// Apply fetch filters here instead of leaving them to the caller.
    pub fn filter_remotely(mut self, enabled: bool) -> Self {
        self.filter_remotely = enabled;
        self
    }

    /// Let `n` write calls succeed, then fail every later one.
    pub fn fail_after_writes(self, n: usize) -> Self {
        self.lock().fail_after_writes = Some(n);
        self
    }

    /// Current rows of `table`, each with its `id`.
    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.lock()
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| !c.is_write())
            .count()
    }

    pub fn write_calls(&self) -> Vec<BackendCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.is_write())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    fn table(&mut self, table: &str) -> Result<&mut MemoryTable, TransportError> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| format!("table not found: {table}").into())
    }

    fn begin_write(&mut self, call: BackendCall) -> Result<(), TransportError> {
        self.calls.push(call);
        if self.fail_after_writes.is_some_and(|limit| self.writes >= limit) {
            return Err("injected write failure".into());
        }
        self.writes += 1;
        Ok(())
    }
}

#[async_trait]
impl TableBackend for MemoryBackend {
    async fn fetch_rows(
        &self,
        table: &str,
        filter: Option<&FilterSpec>,
    ) -> Result<ColumnarTable, TransportError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::Fetch {
            table: table.to_string(),
            filter: filter.cloned(),
        });

        let rows: Vec<Record> = state
            .table(table)?
            .rows
            .iter()
            .filter(|row| !self.filter_remotely || crate::filter::matches(row, filter))
            .cloned()
            .collect();

        // A real table has every column on every row
        let encoded = ColumnarTable::encode(&rows);
        Ok(encoded
            .column_names()
            .map(|name| {
                let values = encoded
                    .column(name)
                    .unwrap_or_default()
                    .iter()
                    .map(|cell| Some(cell.clone().unwrap_or(CellValue::Null)))
                    .collect();
                (name.clone(), values)
            })
            .collect())
    }

    async fn bulk_insert(
        &self,
        table: &str,
        rows: ColumnarTable,
    ) -> Result<Vec<RowId>, TransportError> {
        let mut state = self.lock();
        state.begin_write(BackendCall::Insert {
            table: table.to_string(),
            rows: rows.clone(),
        })?;

        let records = rows.to_records()?;
        let target = state.table(table)?;
        Ok(records.into_iter().map(|r| target.insert(r)).collect())
    }

    async fn bulk_update(&self, table: &str, rows: ColumnarTable) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.begin_write(BackendCall::Update {
            table: table.to_string(),
            rows: rows.clone(),
        })?;

        let records = rows.decode()?;
        let target = state.table(table)?;
        for update in records {
            let id = update.id();
            let row = target
                .rows
                .iter_mut()
                .find(|row| row.id() == id)
                .ok_or_else(|| format!("no row with id {id:?}"))?;
            for (column, value) in update {
                row.set(column, value);
            }
        }
        Ok(())
    }

    async fn bulk_delete(&self, table: &str, ids: Vec<RowId>) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.begin_write(BackendCall::Delete {
            table: table.to_string(),
            ids: ids.clone(),
        })?;

        let target = state.table(table)?;
        target
            .rows
            .retain(|row| row.id().map_or(true, |id| !ids.contains(&id)));
        Ok(())
    }
}
