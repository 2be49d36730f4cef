use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A document waiting in the selection, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedFile {
    pub document: String,
    pub redacted_text_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub redacted_files: Vec<RedactedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub document: String,
    pub evaluation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub evaluations: Vec<EvaluationRecord>,
    #[serde(default)]
    pub evaluation_table: Option<String>,
    #[serde(default)]
    pub yes_no_table: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A finished download of a redacted text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub document: String,
    pub path: PathBuf,
}
