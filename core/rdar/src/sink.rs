use crate::error::{RdarError, Result};
use std::fs;
use std::path::PathBuf;

/// Writes extracted files below a base directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    base: PathBuf,
}

impl FileSink {
    pub fn new(base: impl Into<PathBuf>) -> Result<Self> {
        let base = base.into();
        if base.as_os_str().is_empty() {
            return Err(RdarError::EmptyBaseDir);
        }
        Ok(Self { base })
    }

    /// Destination of an archive path; `\` separators become `/`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let clean = name.replace('\\', "/");
        self.base.join(clean.trim_start_matches('/'))
    }

    /// Write `data` as `name` in one go.
    pub fn write(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.prepare(name)?;
        fs::write(&path, data)?;
        Ok(path)
    }

    fn prepare(&self, name: &str) -> Result<PathBuf> {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        tracing::info!("extracting {}", path.display());
        Ok(path)
    }
}
