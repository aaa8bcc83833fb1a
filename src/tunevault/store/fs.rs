use super::backend::StorageBackend;
use super::LibraryDocument;
use crate::error::{Result, VaultError};
use std::fs;
use std::path::PathBuf;

/// Production backend: one JSON document on disk.
pub struct FsBackend {
    path: PathBuf,
}

impl FsBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(VaultError::Io)?;
            }
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn load(&self) -> Result<LibraryDocument> {
        if !self.path.exists() {
            return Ok(LibraryDocument::default());
        }
        let content = fs::read_to_string(&self.path).map_err(VaultError::Io)?;
        let doc: LibraryDocument =
            serde_json::from_str(&content).map_err(VaultError::Serialization)?;
        Ok(doc)
    }

    fn save(&self, doc: &LibraryDocument) -> Result<()> {
        self.ensure_parent()?;
        let content = serde_json::to_string_pretty(doc).map_err(VaultError::Serialization)?;

        // Write to a sibling tmp file and rename so readers never observe a
        // half-written document.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(VaultError::Io)?;
        fs::rename(&tmp, &self.path).map_err(VaultError::Io)?;
        Ok(())
    }
}
