//! Configuration management for the client.

use std::env;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use tablesync_engine::DEFAULT_BATCH_SIZE;

/// Server used when `TABLESYNC_SERVER` is not set.
pub const DEFAULT_SERVER: &str = "https://api.getgrist.com";

/// Name of the key file looked up in the home directory.
pub const API_KEY_FILE_NAME: &str = ".grist-api-key";

/// Client configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the document server
    pub server: String,
    /// Default document id
    pub doc_id: Option<String>,
    /// Access credential sent as a bearer token
    pub api_key: String,
    /// Maximum rows per request payload
    pub batch_size: NonZeroUsize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server", &self.server)
            .field("doc_id", &self.doc_id)
            .field("api_key", &"<redacted>")
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let server = lookup("TABLESYNC_SERVER")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());

        let doc_id = lookup("TABLESYNC_DOC").filter(|s| !s.trim().is_empty());

        let batch_size = match lookup("TABLESYNC_BATCH_SIZE") {
            Some(raw) => parse_batch_size(&raw)?,
            None => DEFAULT_BATCH_SIZE,
        };

        let api_key = match lookup("TABLESYNC_API_KEY").filter(|k| !k.trim().is_empty()) {
            Some(key) => key.trim().to_string(),
            None => {
                let path = lookup("TABLESYNC_API_KEY_FILE")
                    .map(PathBuf::from)
                    .or_else(default_key_file)
                    .ok_or(ConfigError::MissingApiKey)?;
                read_key_file(&path)?
            }
        };

        Ok(Self {
            server,
            doc_id,
            api_key,
            batch_size,
        })
    }
}

fn parse_batch_size(raw: &str) -> Result<NonZeroUsize, ConfigError> {
    raw.trim()
        .parse::<NonZeroUsize>()
        .map_err(|_| ConfigError::InvalidBatchSize(raw.to_string()))
}

fn default_key_file() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(API_KEY_FILE_NAME))
}

fn read_key_file(path: &Path) -> Result<String, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) if !contents.trim().is_empty() => Ok(contents.trim().to_string()),
        Ok(_) => Err(ConfigError::MissingApiKey),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::MissingApiKey),
        Err(source) => Err(ConfigError::KeyFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no API key: set TABLESYNC_API_KEY or create ~/.grist-api-key")]
    MissingApiKey,

    #[error("cannot read API key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TABLESYNC_BATCH_SIZE value '{0}': expected a positive integer")]
    InvalidBatchSize(String),
}
