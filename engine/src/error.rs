//! Error types for the tablesync engine.

use crate::{ColumnId, RowId};
use thiserror::Error;

/// Error raised by an injected [`TableBackend`](crate::TableBackend) call.
///
/// The engine never inspects it; callers can downcast to the concrete
/// transport error they plugged in.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All possible errors from the tablesync engine.
#[derive(Debug, Error)]
pub enum Error {
    // Caller misuse, raised before any IO
    #[error("invalid sync scope: {0}")]
    InvalidSyncScope(String),

    #[error("record at position {index} has no numeric id")]
    MissingIdentity { index: usize },

    // Data integrity
    #[error("key collision: rows {first} and {second} both have key {key}")]
    KeyCollision {
        key: String,
        first: RowId,
        second: RowId,
    },

    #[error("malformed table: {0}")]
    MalformedTable(String),

    #[error("invalid cell value: {0}")]
    InvalidValue(String),

    // Passed through from the backend
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),
}

impl Error {
    pub(crate) fn filter_outside_keys(column: &ColumnId) -> Self {
        Error::InvalidSyncScope(format!(
            "filter column '{column}' must also be a key column"
        ))
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::filter_outside_keys(&"Age".to_string());
        assert_eq!(
            err.to_string(),
            "invalid sync scope: filter column 'Age' must also be a key column"
        );

        let err = Error::MissingIdentity { index: 3 };
        assert_eq!(err.to_string(), "record at position 3 has no numeric id");

        let err = Error::KeyCollision {
            key: "[\"John\"]".into(),
            first: 1,
            second: 7,
        };
        assert_eq!(
            err.to_string(),
            "key collision: rows 1 and 7 both have key [\"John\"]"
        );
    }

    #[test]
    fn transport_error_keeps_source() {
        use std::error::Error as _;

        let err = Error::Transport("connection reset".into());
        assert_eq!(err.to_string(), "transport error: connection reset");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("connection reset".to_string())
        );
    }
}
