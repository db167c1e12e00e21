//! Consumers of a verified artifact.
//!
//! The real consumer (mail transport) lives outside this crate and plugs in
//! through `Delivery`. `DirectoryDelivery` is the in-tree consumer used by the CLI.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::downloader::FetchResult;
use crate::resolver::ResolvedLink;

/// Reads a staged artifact and hands it on. Must not delete it; the pipeline releases it afterwards.
pub trait Delivery {
    fn deliver(&self, artifact: &FetchResult, link: &ResolvedLink) -> Result<()>;
}

/// Copies the artifact into a directory under its sanitized file name.
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
    dir: PathBuf,
}

impl DirectoryDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

}

impl Delivery for DirectoryDelivery {
    fn deliver(&self, artifact: &FetchResult, link: &ResolvedLink) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir {}", self.dir.display()))?;
        let dest = self.dir.join(&artifact.file_name);
        fs::copy(artifact.file_path(), &dest)
            .with_context(|| format!("copy {} to {}", artifact.file_name, dest.display()))?;
        tracing::info!(
            "delivered {} ({} bytes) from {} to {}",
            artifact.file_name,
            artifact.bytes_written,
            link.canonical_url,
            dest.display()
        );
        Ok(())
    }
}
