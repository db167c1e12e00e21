//! Resolves user-supplied GitHub links to canonical raw-content URLs.
//!
//! `github.com/{org}/{repo}/blob/{branch}/{path}` is a viewer page, not the
//! file bytes; it is rewritten to `raw.githubusercontent.com/{org}/{repo}/{branch}/{path}`.
//! Raw links are re-encoded so they are stable under repeated resolution.
//! Pure and synchronous: no I/O beyond URL parsing.

use serde::Serialize;
use std::sync::Arc;

use crate::error::FetchError;
use crate::policy::{HostPolicy, GITHUB_HOST, RAW_HOST};
use crate::url_model::{build_url, decode_path, file_name_from_segments, parse_lenient, split_segments};

/// Canonical download location for a user link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    /// Absolute, fully percent-encoded `https` URL on an allowlisted host.
    pub canonical_url: String,
    /// Decoded final path segment; never contains separators or control characters.
    pub file_name: String,
}

/// Link resolver for GitHub file links.
#[derive(Debug, Clone)]
pub struct GitHubLinkResolver {
    policy: Arc<HostPolicy>,
}

impl GitHubLinkResolver {
    pub fn new(policy: Arc<HostPolicy>) -> Self {
        Self { policy }
    }

    pub fn resolve(&self, raw_url: &str) -> Result<ResolvedLink, FetchError> {
        let url = parse_lenient(raw_url)?;

        let host = match url.host_str() {
            Some(h) if self.policy.allows_host(h) => h.to_ascii_lowercase(),
            Some(h) => return Err(FetchError::UnsupportedHost(h.to_string())),
            None => return Err(FetchError::UnsupportedHost(String::new())),
        };

        let decoded = decode_path(url.path());
        let segments = split_segments(&decoded);

        let (canonical, file_name) = if host == RAW_HOST {
            let rebuilt = build_url(RAW_HOST, segments.iter().copied(), url.query());
            (rebuilt, file_name_from_segments(&segments))
        } else if host == GITHUB_HOST {
            let rest = blob_target(&segments)
                .ok_or_else(|| FetchError::UnsupportedFormat(url.to_string()))?;
            let rebuilt = build_url(RAW_HOST, rest.iter().copied(), None);
            (rebuilt, file_name_from_segments(&segments))
        } else {
            // Allowlisted, but not a host this resolver knows how to rewrite.
            return Err(FetchError::UnsupportedHost(host));
        };

        let canonical = canonical
            .ok_or_else(|| FetchError::InvalidInput(format!("cannot rebuild URL {}", url)))?;
        // The rewritten target must pass the same check the downloader applies.
        self.policy
            .check(&canonical)
            .map_err(|_| FetchError::UnsupportedHost(canonical.host_str().unwrap_or("").to_string()))?;

        tracing::debug!("resolved {} -> {}", raw_url.trim(), canonical);
        Ok(ResolvedLink {
            canonical_url: canonical.to_string(),
            file_name,
        })
    }
}

impl Default for GitHubLinkResolver {
    fn default() -> Self {
        Self::new(Arc::new(HostPolicy::github()))
    }
}

/// For `[org, repo, "blob", branch, path...]` returns `[org, repo, branch, path...]`.
fn blob_target<'a>(segments: &[&'a str]) -> Option<Vec<&'a str>> {
    if segments.len() < 5 || segments[2] != "blob" {
        return None;
    }
    let (org, repo, branch) = (segments[0], segments[1], segments[3]);
    if org.is_empty() || repo.is_empty() || branch.is_empty() {
        return None;
    }
    let mut target = vec![org, repo, branch];
    target.extend(&segments[4..]);
    Some(target)
}
