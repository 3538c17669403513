use std::path::PathBuf;

use serde_json::Value;
use tablesync_engine::{FilterSpec, Reconciler};
use tracing::info;

use super::{read_records, Context};
use crate::error::Result;

/// Arguments of a sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    pub table: String,
    pub key_columns: Vec<String>,
    pub filter: Option<FilterSpec>,
    pub dry_run: bool,
    /// Records file; stdin when `None`
    pub input: Option<PathBuf>,
}

pub async fn sync(ctx: &Context, request: SyncRequest) -> Result<Value> {
    let desired = read_records(request.input.as_deref()).await?;
    let backend = ctx.doc_tables()?;
    info!(
        doc = backend.doc_id(),
        table = %request.table,
        records = desired.len(),
        "starting sync"
    );

    let reconciler = Reconciler::with_options(&backend, ctx.sync_options(request.dry_run));
    let result = reconciler
        .sync(
            &request.table,
            desired,
            &request.key_columns,
            request.filter.as_ref(),
        )
        .await?;

    info!(
        table = %request.table,
        added = result.num_added,
        updated = result.num_updated,
        "sync complete"
    );
    Ok(serde_json::to_value(result)?)
}
