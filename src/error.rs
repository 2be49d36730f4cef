use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Shape,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no documents selected")]
    NoFilesSelected,
    #[error("another request is still in progress")]
    Busy,
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with status {status}")]
    Status {
        status: u16,
        server_message: Option<String>,
    },
    #[error("failed to parse response body: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("response is missing the `{0}` array")]
    MissingField(&'static str),
    #[error("background worker is not running")]
    WorkerUnavailable,
    #[error("invalid url `{0}`")]
    InvalidUrl(String),
    #[error("failed to save {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NoFilesSelected | ClientError::Busy => ErrorKind::Validation,
            ClientError::MissingField(_) => ErrorKind::Shape,
            _ => ErrorKind::Transport,
        }
    }

    /// Text shown to the user in the alert window. `fallback` is used when
    /// the server gave no message of its own.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::NoFilesSelected => "Please select at least one document to upload.".to_string(),
            ClientError::Busy => "Please wait for the current request to finish.".to_string(),
            ClientError::Status {
                server_message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ClientError::MissingField(_) => {
                "Invalid response from server. Please try again.".to_string()
            }
            ClientError::ReadFile { path, .. } => {
                format!("Could not read {}.", path.display())
            }
            ClientError::WriteFile { path, .. } => {
                format!("Could not save {}.", path.display())
            }
            _ => fallback.to_string(),
        }
    }
}
