//! Bounded single-file downloader.
//!
//! Fetches one resolved URL with libcurl, redirect following disabled at the
//! transport level: every hop is re-validated against the host policy by a
//! bounded loop. The body is streamed into a fresh staging directory under a
//! hard byte cap. Any failure releases the staging directory before the error
//! propagates; on success ownership of the directory moves into `FetchResult`.
//!
//! Blocking; call from `spawn_blocking` if used from async code.

mod handler;
mod head;
mod redirect;

pub use head::ResponseHead;
pub use redirect::{next_hop, RedirectTracker};

use std::io;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::FetchError;
use crate::policy::{check_extension, HostPolicy};
use crate::storage::TempArtifact;
use crate::url_model::sanitize_file_name;
use handler::FetchHandler;

/// Receive buffer size handed to libcurl; the body arrives in chunks of at most this many bytes.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Transport settings for the downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderOptions {
    pub connect_timeout: Duration,
    /// Whole-request deadline, body included.
    pub request_timeout: Duration,
    /// Redirects followed after the initial request.
    pub max_redirects: u32,
    pub user_agent: String,
    /// Parent for staging directories; system temp dir when `None`.
    pub staging_root: Option<PathBuf>,
}

impl Default for DownloaderOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_redirects: 5,
            user_agent: default_user_agent(),
            staging_root: None,
        }
    }
}

pub fn default_user_agent() -> String {
    format!("kindledrop/{}", env!("CARGO_PKG_VERSION"))
}

/// Maximum number of bytes a single fetch may write. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadBudget(NonZeroU64);

impl DownloadBudget {
    /// Budget used when the caller does not supply one (30 MiB).
    pub const DEFAULT_MAX_BYTES: u64 = 30 * 1024 * 1024;

    pub fn new(max_bytes: u64) -> Result<Self, FetchError> {
        NonZeroU64::new(max_bytes)
            .map(Self)
            .ok_or_else(|| FetchError::InvalidInput("max bytes must be positive".to_string()))
    }

    /// Caller-supplied budget when present and positive, otherwise `fallback`.
    pub fn or(max_bytes: Option<u64>, fallback: DownloadBudget) -> Self {
        max_bytes.and_then(NonZeroU64::new).map(Self).unwrap_or(fallback)
    }

    pub fn max_bytes(self) -> u64 {
        self.0.get()
    }
}

impl Default for DownloadBudget {
    fn default() -> Self {
        Self(NonZeroU64::new(Self::DEFAULT_MAX_BYTES).unwrap_or(NonZeroU64::MIN))
    }
}

/// Verified download. Owns the staging directory: call `cleanup()` (or drop
/// the value) once the payload has been consumed.
#[derive(Debug)]
pub struct FetchResult {
    /// Sanitized name the payload was stored under.
    pub file_name: String,
    /// Exact size of the payload file; never above the budget.
    pub bytes_written: u64,
    /// `Content-Type` of the final response, empty when absent.
    pub content_type: String,
    artifact: TempArtifact,
}

impl FetchResult {
    pub fn file_path(&self) -> &Path {
        self.artifact.file_path()
    }

    /// Staging directory containing the payload.
    pub fn dir_path(&self) -> &Path {
        self.artifact.dir_path()
    }

    /// Deletes the payload and its staging directory.
    pub fn cleanup(self) -> io::Result<()> {
        self.artifact.cleanup()
    }
}

/// Outcome of one request attempt.
enum Hop {
    /// 3xx whose validated target is the next request.
    Follow(Url),
    /// 2xx with the body staged under budget.
    Accepted(FetchResult),
}

/// Stateless downloader; safe to share across threads.
#[derive(Debug, Clone)]
pub struct Downloader {
    options: DownloaderOptions,
    policy: Arc<HostPolicy>,
}

impl Downloader {
    pub fn new(options: DownloaderOptions, policy: Arc<HostPolicy>) -> Self {
        Self { options, policy }
    }

    /// Downloads `url` into a fresh staging directory.
    ///
    /// Validation (host, scheme, file name, extension) happens before any
    /// network I/O. Nothing is retried.
    pub fn fetch(
        &self,
        url: &str,
        file_name_hint: Option<&str>,
        budget: DownloadBudget,
    ) -> Result<FetchResult, FetchError> {
        let start = Url::parse(url)
            .map_err(|e| FetchError::InvalidInput(format!("invalid URL {:?}: {}", url, e)))?;
        self.policy.check(&start)?;

        let file_name = sanitize_file_name(file_name_hint);
        check_extension(&file_name)?;

        let mut tracker = RedirectTracker::new(self.options.max_redirects);
        let mut current = start;
        loop {
            let attempt = tracker.begin()?;
            tracing::debug!("GET {} (attempt {})", current, attempt);
            match self.attempt(&current, &file_name, budget)? {
                Hop::Follow(next) => {
                    tracing::debug!("redirect {} -> {}", current, next);
                    current = next;
                }
                Hop::Accepted(result) => {
                    tracing::info!(
                        "fetched {} ({} bytes, {:?}) into {}",
                        current,
                        result.bytes_written,
                        result.content_type,
                        result.dir_path().display()
                    );
                    return Ok(result);
                }
            }
        }
    }

    fn attempt(&self, url: &Url, file_name: &str, budget: DownloadBudget) -> Result<Hop, FetchError> {
        let handler = FetchHandler::new(
            budget.max_bytes(),
            file_name,
            self.options.staging_root.clone(),
        );
        let mut easy = curl::easy::Easy2::new(handler);
        easy.url(url.as_str())?;
        easy.get(true)?;
        easy.follow_location(false)?;
        easy.useragent(&self.options.user_agent)?;
        easy.connect_timeout(self.options.connect_timeout)?;
        easy.timeout(self.options.request_timeout)?;
        easy.buffer_size(CHUNK_SIZE)?;

        let performed = easy.perform();
        // A handler-side abort explains the curl error it caused.
        if let Some(err) = easy.get_mut().abort.take() {
            return Err(err);
        }
        let skipped = easy.get_ref().body_skipped;
        match performed {
            Ok(()) => {}
            // The handler refused a redirect or error body once the head was in.
            Err(e) if skipped && e.is_write_error() => {}
            Err(e) => return Err(e.into()),
        }

        let head = match easy.get_mut().head.take() {
            Some(head) => head,
            None => {
                return Err(FetchError::HttpStatus {
                    status: easy.response_code()?,
                    url: url.to_string(),
                })
            }
        };

        if head.is_redirect() {
            return next_hop(url, &head, &self.policy).map(Hop::Follow);
        }
        if !head.is_success() {
            return Err(FetchError::HttpStatus {
                status: head.status,
                url: url.to_string(),
            });
        }

        let handler = easy.get_mut();
        let bytes_written = handler.written;
        let artifact = handler.finish()?.ok_or_else(|| {
            FetchError::Storage(io::Error::new(
                io::ErrorKind::Other,
                "success response without staged payload",
            ))
        })?;

        Ok(Hop::Accepted(FetchResult {
            file_name: file_name.to_string(),
            bytes_written,
            content_type: head.content_type.unwrap_or_default(),
            artifact,
        }))
    }
}
