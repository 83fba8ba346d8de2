use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{BumpError, Result};

/// Files on disk, resolved against a root directory
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Store rooted at `root`; relative target paths resolve against it
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        FsStore {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Store rooted at the current directory
    pub fn current_dir() -> Self {
        FsStore::new(".")
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl super::DocumentStore for FsStore {
    fn read(&self, path: &Path) -> Result<String> {
        let full = self.resolve(path);
        fs::read_to_string(&full).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BumpError::FileNotFound(path.to_path_buf()),
            _ => BumpError::Io(e),
        })
    }

    fn write(&self, path: &Path, text: &str) -> Result<()> {
        let full = self.resolve(path);
        let dir = match full.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        // The temp file must live next to the target so persist is a rename.
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        if let Ok(metadata) = fs::metadata(&full) {
            tmp.as_file().set_permissions(metadata.permissions())?;
        }
        tmp.persist(&full).map_err(|e| BumpError::Io(e.error))?;

        debug!(path = %full.display(), bytes = text.len(), "wrote file");
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }
}
