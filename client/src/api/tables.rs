//! Table data endpoints of one document, exposed as a [`TableBackend`].

use async_trait::async_trait;
use reqwest::Url;
use tablesync_engine::{ColumnarTable, FilterSpec, RowId, TableBackend, TransportError};

use super::http::ApiClient;
use crate::error::Result;

/// The tables of a single document.
#[derive(Debug, Clone)]
pub struct DocTables {
    api: ApiClient,
    doc_id: String,
}

impl DocTables {
    pub fn new(api: ApiClient, doc_id: impl Into<String>) -> Self {
        Self {
            api,
            doc_id: doc_id.into(),
        }
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn data_url(&self, table: &str, suffix: &[&str]) -> Result<Url> {
        let mut segments = vec!["docs", self.doc_id.as_str(), "tables", table, "data"];
        segments.extend_from_slice(suffix);
        self.api.endpoint(&segments)
    }

    pub async fn fetch(&self, table: &str, filter: Option<&FilterSpec>) -> Result<ColumnarTable> {
        let mut url = self.data_url(table, &[])?;
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            let encoded = serde_json::to_string(filter)?;
            url.query_pairs_mut().append_pair("filter", &encoded);
        }
        self.api.get(url).await
    }

    pub async fn insert(&self, table: &str, rows: &ColumnarTable) -> Result<Vec<RowId>> {
        let url = self.data_url(table, &[])?;
        let ids: Option<Vec<RowId>> = self.api.post(url, rows).await?;
        Ok(ids.unwrap_or_default())
    }

    pub async fn update(&self, table: &str, rows: &ColumnarTable) -> Result<()> {
        let url = self.data_url(table, &[])?;
        let _: serde_json::Value = self.api.patch(url, rows).await?;
        Ok(())
    }

    pub async fn delete(&self, table: &str, ids: &[RowId]) -> Result<()> {
        let url = self.data_url(table, &["delete"])?;
        let _: serde_json::Value = self.api.post(url, ids).await?;
        Ok(())
    }
}

#[async_trait]
impl TableBackend for DocTables {
    async fn fetch_rows(
        &self,
        table: &str,
        filter: Option<&FilterSpec>,
    ) -> std::result::Result<ColumnarTable, TransportError> {
        Ok(self.fetch(table, filter).await?)
    }

    async fn bulk_insert(
        &self,
        table: &str,
        rows: ColumnarTable,
    ) -> std::result::Result<Vec<RowId>, TransportError> {
        Ok(self.insert(table, &rows).await?)
    }

    async fn bulk_update(
        &self,
        table: &str,
        rows: ColumnarTable,
    ) -> std::result::Result<(), TransportError> {
        Ok(self.update(table, &rows).await?)
    }

    async fn bulk_delete(
        &self,
        table: &str,
        ids: Vec<RowId>,
    ) -> std::result::Result<(), TransportError> {
        Ok(self.delete(table, &ids).await?)
    }
}
