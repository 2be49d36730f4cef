mod client;
mod file_processor;
mod selection;
mod types;

pub use client::RedactionClient;
pub use file_processor::{FileProcessor, CRITERIA_EXTENSIONS, DOCUMENT_EXTENSIONS};
pub use selection::SelectedFileSet;
pub use types::{EvaluationRecord, EvaluationResponse, RedactedFile, SavedFile, SelectedFile};
