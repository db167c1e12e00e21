//! Per-fetch staging directory and payload file.
//!
//! Each fetch gets its own uniquely named directory, so concurrent fetches
//! never contend. The directory lives exactly as long as the owning
//! `TempArtifact`: explicit `cleanup()` reports failures, drop releases
//! best-effort and only logs.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix of every staging directory name.
pub const STAGING_PREFIX: &str = "kindledrop-";

/// Exclusively owned staging directory holding one payload file.
#[derive(Debug)]
pub struct TempArtifact {
    dir: Option<TempDir>,
    file_path: PathBuf,
}

impl TempArtifact {
    /// Creates a fresh staging directory (under `root`, or the system temp dir)
    /// and an empty payload file named `file_name` inside it.
    ///
    /// `file_name` must already be sanitized: no separators.
    pub fn create(root: Option<&Path>, file_name: &str) -> io::Result<(Self, File)> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX);
        let dir = match root {
            Some(root) => {
                fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        let file_path = dir.path().join(file_name);
        // On error `dir` drops here and the directory is removed.
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)?;
        Ok((
            Self {
                dir: Some(dir),
                file_path,
            },
            file,
        ))
    }

    /// Path of the payload file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Staging directory containing the payload.
    pub fn dir_path(&self) -> &Path {
        self.file_path.parent().unwrap_or(&self.file_path)
    }

    /// Removes the payload and its directory, reporting failure.
    pub fn cleanup(mut self) -> io::Result<()> {
        match self.dir.take() {
            Some(dir) => dir.close(),
            None => Ok(()),
        }
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::warn!("failed to remove staging dir {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn entries(root: &Path) -> usize {
        fs::read_dir(root).unwrap().count()
    }

    #[test]
    fn create_places_file_in_unique_prefixed_dir() {
        let root = tempfile::tempdir().unwrap();
        let (a, _fa) = TempArtifact::create(Some(root.path()), "book.pdf").unwrap();
        let (b, _fb) = TempArtifact::create(Some(root.path()), "book.pdf").unwrap();
        assert_ne!(a.dir_path(), b.dir_path());
        assert!(a.file_path().ends_with("book.pdf"));
        let dir_name = a.dir_path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(dir_name.starts_with(STAGING_PREFIX));
        assert_eq!(entries(root.path()), 2);
    }

    #[test]
    fn cleanup_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let (artifact, mut file) = TempArtifact::create(Some(root.path()), "x.epub").unwrap();
        file.write_all(b"payload").unwrap();
        drop(file);
        let dir = artifact.dir_path().to_path_buf();
        artifact.cleanup().unwrap();
        assert!(!dir.exists());
        assert_eq!(entries(root.path()), 0);
    }

    #[test]
    fn drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = {
            let (artifact, _file) = TempArtifact::create(Some(root.path()), "x.mobi").unwrap();
            artifact.dir_path().to_path_buf()
        };
        assert!(!dir.exists());
    }

    #[test]
    fn creates_missing_root() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        let (artifact, _file) = TempArtifact::create(Some(&nested), "x.pdf").unwrap();
        assert!(artifact.file_path().starts_with(&nested));
    }
}
