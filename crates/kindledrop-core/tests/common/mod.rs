#![allow(dead_code)]

pub mod doc_server;

use kindledrop_core::{Downloader, DownloaderOptions, HostPolicy};
use std::path::Path;
use std::sync::Arc;

/// Policy admitting only the plain-HTTP loopback test server.
pub fn loopback_policy() -> Arc<HostPolicy> {
    Arc::new(HostPolicy::new("http", ["127.0.0.1"]))
}

pub fn loopback_options(staging_root: &Path) -> DownloaderOptions {
    DownloaderOptions {
        staging_root: Some(staging_root.to_path_buf()),
        ..DownloaderOptions::default()
    }
}

pub fn loopback_downloader(staging_root: &Path) -> Downloader {
    Downloader::new(loopback_options(staging_root), loopback_policy())
}

/// Number of entries left under the staging root.
pub fn staged_entries(staging_root: &Path) -> usize {
    std::fs::read_dir(staging_root).map(|d| d.count()).unwrap_or(0)
}
