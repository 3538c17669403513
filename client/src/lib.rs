//! # tablesync-client
//!
//! HTTP side of tablesync: a [`TableBackend`](tablesync_engine::TableBackend)
//! that talks to a document server's REST API, plus the commands behind the
//! `tablesync` CLI.
//!
//! ```no_run
//! use tablesync_client::{ApiClient, DocTables};
//! use tablesync_engine::{Reconciler, Record};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let api = ApiClient::new("https://api.getgrist.com", "my-key")?;
//! let people = DocTables::new(api, "docId");
//!
//! let desired = vec![Record::new().with("Name", "John").with("Age", 31)];
//! let result = Reconciler::new(&people)
//!     .sync("People", desired, &["Name"], None)
//!     .await?;
//! println!("added {}, updated {}", result.num_added, result.num_updated);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod error;

pub use api::{ApiClient, DocTables};
pub use config::{Config, ConfigError};
pub use error::{ClientError, Result};
