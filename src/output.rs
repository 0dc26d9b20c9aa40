//! Per-site output folders

use crate::error::{CaptureError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Folder holding every artifact captured for one URL
#[derive(Debug, Clone, PartialEq)]
pub struct SiteFolder {
    name: String,
    dir: PathBuf,
}

impl SiteFolder {
    /// Derive the folder for `url` under `base` without touching the filesystem
    pub fn for_url(base: impl AsRef<Path>, url: &str) -> Result<Self> {
        let name = folder_name(url)?;
        Ok(Self { dir: base.as_ref().join(&name), name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn text_path(&self) -> PathBuf {
        self.dir.join(format!("{}_text.txt", self.name))
    }

    pub fn dom_path(&self) -> PathBuf {
        self.dir.join(format!("{}_dom.html", self.name))
    }

    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn write_text(&self, text: &str) -> Result<PathBuf> {
        self.write(self.text_path(), text)
    }

    pub fn write_dom(&self, document: &str) -> Result<PathBuf> {
        self.write(self.dom_path(), document)
    }

    fn write(&self, path: PathBuf, contents: &str) -> Result<PathBuf> {
        self.create()?;
        fs::write(&path, contents)?;
        log::info!("Saved {}", path.display());
        Ok(path)
    }
}

/// Filesystem-safe name built from host and path
pub fn folder_name(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| CaptureError::InvalidArgument(format!("Invalid URL '{}': {}", url, e)))?;

    let mut domain = parsed.host_str().unwrap_or_default().replace("www.", "");
    if let Some(port) = parsed.port() {
        domain = format!("{}:{}", domain, port);
    }

    let path = parsed.path().trim_matches('/').replace('/', "_");
    let raw = if path.is_empty() {
        domain
    } else {
        format!("{}_{}", domain, path)
    };

    let safe: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '.' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let name = safe.trim_matches('_').replace("__", "_");

    if name.is_empty() {
        return Err(CaptureError::InvalidArgument(format!("Cannot derive a folder name from '{}'", url)));
    }
    Ok(name)
}
