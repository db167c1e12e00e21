//! Easy2 handler for one request attempt.
//!
//! Collects response headers; once the head is complete it either stops the
//! transfer (redirects, error statuses: the head is all the downloader needs)
//! or stages the body into a fresh temp directory, enforcing the byte budget
//! on the declared length and on every chunk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use super::head::{parse_head, ResponseHead};
use crate::error::FetchError;
use crate::storage::TempArtifact;

/// Handler state for a single GET. Implements curl's Handler for Easy2.
pub(super) struct FetchHandler {
    limit: u64,
    file_name: String,
    staging_root: Option<PathBuf>,
    response_headers: Vec<String>,
    pub(super) head: Option<ResponseHead>,
    // Declared before `artifact` so the handle closes before the directory is removed.
    file: Option<BufWriter<File>>,
    artifact: Option<TempArtifact>,
    pub(super) written: u64,
    /// Set when the body of a non-success response was refused on purpose.
    pub(super) body_skipped: bool,
    /// Reason the handler aborted the transfer; takes precedence over the curl error.
    pub(super) abort: Option<FetchError>,
}

impl FetchHandler {
    pub(super) fn new(limit: u64, file_name: &str, staging_root: Option<PathBuf>) -> Self {
        Self {
            limit,
            file_name: file_name.to_string(),
            staging_root,
            response_headers: Vec::new(),
            head: None,
            file: None,
            artifact: None,
            written: 0,
            body_skipped: false,
            abort: None,
        }
    }

    /// Called on the blank line ending a header block. Returning false aborts the transfer.
    fn on_head_complete(&mut self) -> bool {
        let head = match parse_head(&self.response_headers) {
            Some(h) => h,
            None => return true,
        };
        if head.is_interim() {
            self.response_headers.clear();
            return true;
        }
        if head.is_success() {
            if let Some(declared) = head.content_length {
                if declared > self.limit {
                    self.abort = Some(FetchError::TooLarge {
                        limit: self.limit,
                        received: declared,
                        declared: true,
                    });
                    return false;
                }
            }
            match TempArtifact::create(self.staging_root.as_deref(), &self.file_name) {
                Ok((artifact, file)) => {
                    self.artifact = Some(artifact);
                    self.file = Some(BufWriter::new(file));
                }
                Err(e) => {
                    self.abort = Some(FetchError::Storage(e));
                    return false;
                }
            }
        }
        self.head = Some(head);
        true
    }

    /// Flushes the payload and hands over the staged artifact.
    /// `None` when the response never produced a success head.
    pub(super) fn finish(&mut self) -> Result<Option<TempArtifact>, FetchError> {
        if let Some(file) = self.file.take() {
            let file = file.into_inner().map_err(|e| FetchError::Storage(e.into_error()))?;
            file.sync_all()?;
        }
        Ok(self.artifact.take())
    }
}

impl curl::easy::Handler for FetchHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        let text = String::from_utf8_lossy(data);
        let line = text.trim_end();
        if line.starts_with("HTTP/") {
            self.response_headers.clear();
            self.head = None;
            self.body_skipped = false;
        }
        if line.is_empty() {
            return self.on_head_complete();
        }
        self.response_headers.push(line.to_string());
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        let file = match (&self.head, self.file.as_mut()) {
            (Some(head), Some(file)) if head.is_success() => file,
            // Redirect and error bodies are not read; ending here makes libcurl
            // report a write error, which the caller treats as a finished head.
            _ => {
                self.body_skipped = true;
                return Ok(0);
            }
        };
        let total = self.written + data.len() as u64;
        if total > self.limit {
            self.abort = Some(FetchError::TooLarge {
                limit: self.limit,
                received: total,
                declared: false,
            });
            return Ok(0);
        }
        if let Err(e) = file.write_all(data) {
            tracing::warn!("staging write failed: {}", e);
            self.abort = Some(FetchError::Storage(e));
            return Ok(0);
        }
        self.written = total;
        Ok(data.len())
    }
}
