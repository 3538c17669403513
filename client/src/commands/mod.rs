//! Command implementations shared by the CLI.
//!
//! Each command returns the JSON value the CLI prints on success.

mod data;
mod meta;
mod sync;

pub use data::{add, delete, fetch, update};
pub use meta::{orgs, tables, workspaces};
pub use sync::{sync, SyncRequest};

use std::num::NonZeroUsize;
use std::path::Path;

use tablesync_engine::{Record, SyncOptions};
use tokio::io::AsyncReadExt;

use crate::api::{ApiClient, DocTables};
use crate::config::Config;
use crate::error::{ClientError, Result};

/// Everything a command needs: the API client and the selected document.
#[derive(Debug, Clone)]
pub struct Context {
    pub api: ApiClient,
    pub doc_id: Option<String>,
    pub batch_size: NonZeroUsize,
}

impl Context {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(&config.server, config.api_key.clone())?,
            doc_id: config.doc_id.clone(),
            batch_size: config.batch_size,
        })
    }

    pub fn doc_id(&self) -> Result<&str> {
        self.doc_id.as_deref().ok_or(ClientError::MissingDocument)
    }

    pub fn doc_tables(&self) -> Result<DocTables> {
        Ok(DocTables::new(self.api.clone(), self.doc_id()?))
    }

    pub fn sync_options(&self, dry_run: bool) -> SyncOptions {
        SyncOptions {
            batch_size: self.batch_size,
            dry_run,
        }
    }
}

/// Read a JSON array of records from `path`, or from stdin when absent or `-`.
pub async fn read_records(path: Option<&Path>) -> Result<Vec<Record>> {
    let text = match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path).await?,
        _ => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            text
        }
    };
    Ok(serde_json::from_str(&text)?)
}
