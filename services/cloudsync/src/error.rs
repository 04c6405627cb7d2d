//! Cloud sync service errors
//!
//! Every per-cycle failure is caught at the polling loop boundary; none of
//! these terminate the process. Transport/Api skip the cycle, ConfRead
//! degrades to an empty baseline, ConfWrite is logged loudly, Notify is a
//! warning.

use crate::cloud::FetchError;
use tellstick_conf::ConfError;
use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CloudSyncError>;

#[derive(Debug, Error)]
pub enum CloudSyncError {
    /// Network-level failure during the cloud call
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx HTTP response from the cloud API
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Service configuration invalid or unloadable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local conf file unreadable or unparseable
    #[error("Conf read error: {0}")]
    ConfRead(String),

    /// Local conf file could not be written
    #[error("Conf write error: {0}")]
    ConfWrite(String),

    /// Reload signal could not be delivered
    #[error("Notify error: {0}")]
    Notify(String),
}

impl From<FetchError> for CloudSyncError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Transport(msg) => CloudSyncError::Transport(msg),
            FetchError::Api { status, body } => CloudSyncError::Api { status, body },
        }
    }
}

impl From<ConfError> for CloudSyncError {
    fn from(err: ConfError) -> Self {
        CloudSyncError::ConfRead(err.to_string())
    }
}
