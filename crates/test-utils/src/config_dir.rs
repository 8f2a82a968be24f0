//! Temporary configuration directories for loader tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory that is removed when dropped.
///
/// ```ignore
/// let dir = ConfigDir::new()?;
/// dir.write("providers/demo.yaml", fixtures::PROVIDER_YAML)?;
/// ```
pub struct ConfigDir {
    dir: TempDir,
}

impl ConfigDir {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: impl AsRef<Path>, content: &str) -> io::Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn mkdir(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}
