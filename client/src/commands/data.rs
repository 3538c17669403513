use std::path::Path;

use serde_json::{json, Value};
use tablesync_engine::{FilterSpec, Reconciler, RowId};

use super::{read_records, Context};
use crate::error::Result;

pub async fn fetch(ctx: &Context, table: &str, filter: Option<&FilterSpec>) -> Result<Value> {
    let backend = ctx.doc_tables()?;
    let records = Reconciler::new(&backend).fetch_records(table, filter).await?;
    Ok(serde_json::to_value(records)?)
}

pub async fn add(ctx: &Context, table: &str, input: Option<&Path>) -> Result<Value> {
    let records = read_records(input).await?;
    let backend = ctx.doc_tables()?;
    let ids = Reconciler::with_options(&backend, ctx.sync_options(false))
        .add_records(table, &records)
        .await?;
    Ok(json!(ids))
}

pub async fn update(ctx: &Context, table: &str, input: Option<&Path>) -> Result<Value> {
    let records = read_records(input).await?;
    let count = records.len();
    let backend = ctx.doc_tables()?;
    Reconciler::with_options(&backend, ctx.sync_options(false))
        .update_records(table, records)
        .await?;
    Ok(json!({ "updated": count }))
}

pub async fn delete(ctx: &Context, table: &str, ids: &[RowId]) -> Result<Value> {
    let backend = ctx.doc_tables()?;
    Reconciler::with_options(&backend, ctx.sync_options(false))
        .delete_records(table, ids)
        .await?;
    Ok(json!({ "deleted": ids.len() }))
}
