//! Local directory for uploaded source files.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{RagError, Result};

/// Files are keyed by their bare file name; saving the same name twice
/// overwrites the earlier upload.
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(filename)?;
        fs::create_dir_all(&self.root)?;
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "saved upload");
        Ok(path)
    }

    /// Read a saved upload as text. Invalid UTF-8 is replaced rather than
    /// rejected.
    pub fn read_text(&self, filename: &str) -> Result<String> {
        let bytes = fs::read(self.path_for(filename)?)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn path_for(&self, filename: &str) -> Result<PathBuf> {
        // Accept either separator so "..\\x" from a browser upload cannot escape
        let name = filename
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or_default()
            .trim();

        if name.is_empty() || name == "." || name == ".." {
            return Err(RagError::Store(format!(
                "invalid upload file name '{}'",
                filename
            )));
        }

        Ok(self.root.join(name))
    }
}
