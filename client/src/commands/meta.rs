use serde_json::Value;

use super::Context;
use crate::error::Result;

pub async fn orgs(ctx: &Context) -> Result<Value> {
    Ok(serde_json::to_value(ctx.api.list_orgs().await?)?)
}

pub async fn workspaces(ctx: &Context, org: &str) -> Result<Value> {
    Ok(serde_json::to_value(ctx.api.list_workspaces(org).await?)?)
}

/// Tables of the selected document, or the columns of one table.
pub async fn tables(ctx: &Context, table: Option<&str>) -> Result<Value> {
    let doc_id = ctx.doc_id()?;
    let listed = match table {
        Some(table) => ctx.api.list_columns(doc_id, table).await?,
        None => ctx.api.list_tables(doc_id).await?,
    };
    Ok(serde_json::to_value(listed)?)
}
