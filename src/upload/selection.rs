use crate::upload::types::SelectedFile;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Documents chosen for the next upload, in selection order. Names are
/// unique: a second file with an already selected name is skipped.
#[derive(Debug, Clone, Default)]
pub struct SelectedFileSet {
    files: Vec<SelectedFile>,
}

impl SelectedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `paths` into the set and returns how many were added.
    pub fn extend<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut added = 0;
        for path in paths {
            let path = path.as_ref();
            let Some(name) = file_name_of(path) else {
                debug!("Skipping path without a file name: {}", path.display());
                continue;
            };
            if self.contains(&name) {
                debug!("Skipping duplicate document '{}'", name);
                continue;
            }
            let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            self.files.push(SelectedFile {
                name,
                path: path.to_path_buf(),
                size,
            });
            added += 1;
        }
        added
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<SelectedFile> {
        let index = self.files.iter().position(|f| f.name == name)?;
        Some(self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &SelectedFile> {
        self.files.iter()
    }

    #[cfg(test)]
    pub fn names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.name.clone()).collect()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn to_vec(&self) -> Vec<SelectedFile> {
        self.files.clone()
    }
}

pub(crate) fn file_name_of(path: &Path) -> Option<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
}
