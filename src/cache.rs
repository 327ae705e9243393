use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

/// One saved calendar page on disk. Not keyed by date range or region.
#[derive(Debug, Clone)]
pub struct PageCache {
    path: PathBuf,
}

impl PageCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PageCache { path: path.into() }
    }

    pub fn read_if_present(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            debug!("No cached page at {}", self.path.display());
            return Ok(None);
        }
        let html = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read cached page {}", self.path.display()))?;
        info!(bytes = html.len(), "Using cached page {}", self.path.display());
        Ok(Some(html))
    }

    pub fn write(&self, html: &str) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        std::fs::write(&self.path, html)
            .with_context(|| format!("Failed to write cached page {}", self.path.display()))
    }

    /// Returns whether there was anything to remove.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove cached page {}", self.path.display()))?;
        Ok(true)
    }
}

// ── Tests ──
