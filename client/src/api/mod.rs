//! Client side of the document server's REST API.

mod http;
mod metadata;
mod tables;

pub use http::ApiClient;
pub use metadata::{Described, Doc, Org, Workspace};
pub use tables::DocTables;
