pub mod invoker;
pub mod object_store;
pub mod photo_table;

use thiserror::Error;

/// Failure taxonomy at the remote-operation boundary. Adapters convert
/// every transport, credential, and protocol problem into one of these;
/// nothing panics and nothing escapes past the adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote operation failed: {0}")]
    Remote(String),
    #[error("credential error: {0}")]
    Credential(String),
    #[error("malformed response: {0}")]
    Protocol(String),
}

impl AdapterError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout(err.to_string())
        } else {
            AdapterError::Transport(err.to_string())
        }
    }
}
