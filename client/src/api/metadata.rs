//! Organisation, workspace and document metadata endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::http::ApiClient;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Org {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub docs: Vec<Doc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A table or column entry: its id plus whatever fields the server reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Described {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct TableList {
    tables: Vec<Described>,
}

#[derive(Deserialize)]
struct ColumnList {
    columns: Vec<Described>,
}

impl ApiClient {
    pub async fn list_orgs(&self) -> Result<Vec<Org>> {
        self.get(self.endpoint(&["orgs"])?).await
    }

    /// `org` is a numeric id, a domain, or `current`.
    pub async fn get_org(&self, org: &str) -> Result<Org> {
        self.get(self.endpoint(&["orgs", org])?).await
    }

    pub async fn list_workspaces(&self, org: &str) -> Result<Vec<Workspace>> {
        self.get(self.endpoint(&["orgs", org, "workspaces"])?).await
    }

    pub async fn get_workspace(&self, workspace_id: i64) -> Result<Workspace> {
        let id = workspace_id.to_string();
        self.get(self.endpoint(&["workspaces", id.as_str()])?).await
    }

    pub async fn get_doc(&self, doc_id: &str) -> Result<Doc> {
        self.get(self.endpoint(&["docs", doc_id])?).await
    }

    pub async fn rename_doc(&self, doc_id: &str, name: &str) -> Result<()> {
        let _: Value = self
            .patch(self.endpoint(&["docs", doc_id])?, &json!({ "name": name }))
            .await?;
        Ok(())
    }

    pub async fn list_tables(&self, doc_id: &str) -> Result<Vec<Described>> {
        let list: TableList = self.get(self.endpoint(&["docs", doc_id, "tables"])?).await?;
        Ok(list.tables)
    }

    pub async fn list_columns(&self, doc_id: &str, table: &str) -> Result<Vec<Described>> {
        let list: ColumnList = self
            .get(self.endpoint(&["docs", doc_id, "tables", table, "columns"])?)
            .await?;
        Ok(list.columns)
    }
}
