//! Resolve → fetch → verify → deliver, releasing the staged artifact on every path.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::content::verify_payload;
use crate::delivery::Delivery;
use crate::downloader::{DownloadBudget, Downloader, DownloaderOptions, FetchResult};
use crate::error::{ErrorClass, FetchError};
use crate::policy::{check_extension, HostPolicy};
use crate::resolver::{GitHubLinkResolver, ResolvedLink};
use crate::url_model::sanitize_file_name;

/// Input from the request-handling layer. Fields the pipeline does not use
/// (recipient, SMTP settings) are ignored when deserializing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub url: String,
    /// Overrides the file name derived from the link.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Resolve and validate only: no download, no delivery.
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub limits: Option<Limits>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    /// Per-request byte budget; zero means the pipeline default.
    pub max_bytes: u64,
}

/// Result reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub ok: bool,
    pub resolved_url: String,
    pub file_name: String,
    pub bytes: u64,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("delivery failed: {0:#}")]
    Delivery(anyhow::Error),
}

impl PipelineError {
    /// Delivery failures are upstream failures, like a rejected SMTP send.
    pub fn class(&self) -> ErrorClass {
        match self {
            PipelineError::Fetch(e) => e.class(),
            PipelineError::Delivery(_) => ErrorClass::Gateway,
        }
    }
}

/// Owns one resolver, one downloader and the delivery step. Stateless between calls.
pub struct SendPipeline<D> {
    resolver: GitHubLinkResolver,
    downloader: Downloader,
    delivery: D,
    default_budget: DownloadBudget,
}

impl<D: Delivery> SendPipeline<D> {
    /// Builds resolver and downloader around the same host policy.
    pub fn new(
        policy: Arc<HostPolicy>,
        options: DownloaderOptions,
        default_budget: DownloadBudget,
        delivery: D,
    ) -> Self {
        Self {
            resolver: GitHubLinkResolver::new(Arc::clone(&policy)),
            downloader: Downloader::new(options, policy),
            delivery,
            default_budget,
        }
    }

    pub fn send(&self, req: &SendRequest) -> Result<SendOutcome, PipelineError> {
        let link = self.resolver.resolve(&req.url)?;
        self.send_resolved(link, req)
    }

    /// Runs the pipeline for an already resolved link; `req.url` is ignored.
    pub fn send_resolved(&self, link: ResolvedLink, req: &SendRequest) -> Result<SendOutcome, PipelineError> {
        let hint = req
            .file_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&link.file_name);

        if req.dry_run {
            let file_name = sanitize_file_name(Some(hint));
            check_extension(&file_name)?;
            return Ok(SendOutcome {
                ok: true,
                resolved_url: link.canonical_url,
                file_name,
                bytes: 0,
                message: "Dry run: resolved + validated.".to_string(),
            });
        }

        let max_bytes = req.limits.map(|l| l.max_bytes);
        let budget = DownloadBudget::or(max_bytes, self.default_budget);
        let artifact = self
            .downloader
            .fetch(&link.canonical_url, Some(hint), budget)?;

        let outcome = self.consume(&artifact, &link);
        let staged = artifact.dir_path().to_path_buf();
        if let Err(e) = artifact.cleanup() {
            tracing::warn!("failed to remove staging dir {}: {}", staged.display(), e);
        }
        outcome
    }

    fn consume(&self, artifact: &FetchResult, link: &ResolvedLink) -> Result<SendOutcome, PipelineError> {
        let format = verify_payload(artifact.file_path(), &artifact.file_name)?;
        tracing::debug!("{} verified as {}", artifact.file_name, format.label());
        self.delivery
            .deliver(artifact, link)
            .map_err(PipelineError::Delivery)?;
        Ok(SendOutcome {
            ok: true,
            resolved_url: link.canonical_url.clone(),
            file_name: artifact.file_name.clone(),
            bytes: artifact.bytes_written,
            message: "Delivered.".to_string(),
        })
    }
}
