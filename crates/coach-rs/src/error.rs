//! Error types for the completion client, history store, and coach session.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single completion request.
///
/// Every variant carries the underlying message so the caller can surface it
/// as-is. Nothing here is retried.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("{0} environment variable is not set")]
    MissingCredential(&'static str),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("completion API HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("completion API error: {0}")]
    Api(String),

    #[error("failed to parse response: {0}")]
    Decode(String),

    #[error("completion response contained no text")]
    EmptyResponse,
}

/// Failure reading or writing the persisted plan/feedback history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read history file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write history file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("history file {} is not a JSON array of entries: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure of a coach session step.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("no plan is awaiting feedback")]
    NoPlanPending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_includes_status_and_body() {
        let err = CompletionError::Http {
            status: 401,
            body: "bad key".into(),
        };
        assert_eq!(err.to_string(), "completion API HTTP 401: bad key");
    }

    #[test]
    fn session_error_is_transparent_over_sources() {
        let err: SessionError = CompletionError::Api("quota exceeded".into()).into();
        assert_eq!(err.to_string(), "completion API error: quota exceeded");
    }

    #[test]
    fn history_error_names_the_file() {
        let err = HistoryError::Read {
            path: PathBuf::from("/tmp/history.json"),
            source: std::io::Error::other("denied"),
        };
        assert!(err.to_string().contains("/tmp/history.json"));
    }
}
