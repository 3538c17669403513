//! # Tablesync Engine
//!
//! Reconciles a caller-supplied set of records against the current contents
//! of a remote table, issuing the smallest set of bulk inserts and partial
//! updates that brings the table in line.
//!
//! ## Design Principles
//!
//! - **No transport**: network access arrives through the [`TableBackend`] trait
//! - **Deterministic**: same rows and records in, same requests out, in the same order
//! - **Sequential**: one request in flight at a time, no retries
//! - **Partial updates**: only cells that differ are sent; absent cells are never touched
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] maps column ids to [`CellValue`]s. A column the record does
//! not mention is *absent*, which is different from a present `Null`.
//!
//! ### Keys and filters
//!
//! Rows are matched on a list of key columns via [`make_key`]. A
//! [`FilterSpec`] narrows a sync to rows whose values fall in allow-lists;
//! every filter column must also be a key column.
//!
//! ### Batches
//!
//! Payloads are bounded by [`chunk`], and updates are split by
//! [`group_by_shape`] so that every payload has one consistent column set.
//! [`ColumnarTable`] is the column-oriented wire form.
//!
//! ### Reconciliation
//!
//! The [`Reconciler`] fetches, diffs ([`SyncPlan`]) and writes.
//!
//! ## Quick Start
//!
//! ```rust
//! use tablesync_engine::{SyncPlan, Record};
//! use serde_json::json;
//!
//! let current = vec![Record::try_from(json!({"id": 1, "Name": "John", "Age": 30})).unwrap()];
//! let desired = vec![
//!     Record::try_from(json!({"Name": "John", "Age": 31})).unwrap(),
//!     Record::try_from(json!({"Name": "Mary", "Age": 25})).unwrap(),
//! ];
//!
//! let plan = SyncPlan::build(current, desired, &["Name"], None).unwrap();
//! assert_eq!(plan.inserts.len(), 1);
//! assert_eq!(
//!     plan.updates,
//!     vec![Record::try_from(json!({"id": 1, "Age": 31})).unwrap()]
//! );
//! ```
//!
//! Against a live store, hand a [`TableBackend`] to a [`Reconciler`] and call
//! [`Reconciler::sync`]. The [`memory`] module has an in-memory backend.

pub mod backend;
pub mod batch;
pub mod columnar;
pub mod error;
pub mod filter;
pub mod key;
pub mod memory;
pub mod reconcile;
pub mod record;

// Re-export main types at crate root
pub use backend::TableBackend;
pub use batch::{chunk, group_by_shape, DEFAULT_BATCH_SIZE};
pub use columnar::ColumnarTable;
pub use error::{Error, Result, TransportError};
pub use filter::FilterSpec;
pub use key::make_key;
pub use memory::{BackendCall, MemoryBackend};
pub use reconcile::{
    diff, validate_scope, DiffOutcome, Reconciler, SyncOptions, SyncPlan, SyncResult,
};
pub use record::{CellValue, Record, ID_COLUMN};

/// Type aliases for clarity
pub type ColumnId = String;
pub type RowId = i64;
