use crate::error::ClientError;
use crate::upload::selection::file_name_of;
use ignore::Walk;
use reqwest::multipart::Part;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions the server can extract text from.
pub const DOCUMENT_EXTENSIONS: [&str; 2] = ["pdf", "docx"];

/// Criteria are read as a spreadsheet when `.xlsx`, otherwise as text.
pub const CRITERIA_EXTENSIONS: [&str; 4] = ["xlsx", "csv", "txt", "md"];

pub struct FileProcessor;

impl FileProcessor {
    /// Lists every supported document below `folder`, honouring
    /// `.gitignore`/`.ignore` files and skipping hidden entries.
    pub fn collect_documents(folder: &Path) -> Vec<PathBuf> {
        let mut documents = Vec::new();
        for entry in Walk::new(folder) {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && Self::is_supported_document(path) {
                        documents.push(path.to_path_buf());
                    }
                }
                Err(e) => warn!("Skipping unreadable entry under {}: {}", folder.display(), e),
            }
        }
        documents.sort();
        debug!(
            "Found {} supported documents in {}",
            documents.len(),
            folder.display()
        );
        documents
    }

    pub fn is_supported_document(path: &Path) -> bool {
        Self::has_extension(path, &DOCUMENT_EXTENSIONS)
    }

    pub fn is_supported_criteria(path: &Path) -> bool {
        Self::has_extension(path, &CRITERIA_EXTENSIONS)
    }

    fn has_extension(path: &Path, extensions: &[&str]) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Reads `path` into a multipart part carrying its file name and a
    /// MIME type guessed from the extension.
    pub async fn to_part(path: &Path) -> Result<Part, ClientError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = file_name_of(path).unwrap_or_else(|| "document".to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())?;
        Ok(part)
    }
}
