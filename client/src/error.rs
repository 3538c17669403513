//! Unified error handling for the client.

use crate::config::ConfigError;

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid server URL '{0}'")]
    InvalidServer(String),

    #[error("No document selected: pass --doc or set TABLESYNC_DOC")]
    MissingDocument,

    #[error("Sync error: {0}")]
    Engine(#[from] tablesync_engine::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status of a rejected request, if that is what this is.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::Engine(tablesync_engine::Error::Transport(source)) => source
                .downcast_ref::<ClientError>()
                .and_then(ClientError::status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reaches_through_transport_errors() {
        let api = ClientError::Api {
            status: reqwest::StatusCode::NOT_FOUND,
            body: "no such table".into(),
        };
        let wrapped = ClientError::from(tablesync_engine::Error::Transport(Box::new(api)));
        assert_eq!(wrapped.status(), Some(reqwest::StatusCode::NOT_FOUND));
        assert_eq!(ClientError::MissingDocument.status(), None);
    }

    #[test]
    fn api_error_display() {
        let err = ClientError::Api {
            status: reqwest::StatusCode::BAD_REQUEST,
            body: "{\"error\":\"bad\"}".into(),
        };
        assert_eq!(err.to_string(), "API error 400 Bad Request: {\"error\":\"bad\"}");
    }
}
