//! Manual redirect handling: bounded attempt counter and per-hop validation.

use url::Url;

use super::head::ResponseHead;
use crate::error::FetchError;
use crate::policy::HostPolicy;

/// Counts request attempts (initial request plus redirects) against a hard cap.
#[derive(Debug, Clone)]
pub struct RedirectTracker {
    attempts: u32,
    max_attempts: u32,
}

impl RedirectTracker {
    /// Allows the initial request plus `max_redirects` follow-ups.
    pub fn new(max_redirects: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts: max_redirects.saturating_add(1),
        }
    }

    /// Registers the next attempt, failing once the cap is used up.
    pub fn begin(&mut self) -> Result<u32, FetchError> {
        if self.attempts >= self.max_attempts {
            return Err(FetchError::TooManyRedirects {
                attempts: self.attempts,
            });
        }
        self.attempts += 1;
        Ok(self.attempts)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Resolves the `Location` of a 3xx head against `current` and validates the
/// target with the same policy as the initial URL.
pub fn next_hop(current: &Url, head: &ResponseHead, policy: &HostPolicy) -> Result<Url, FetchError> {
    let location = head
        .location
        .as_deref()
        .ok_or(FetchError::MissingLocation {
            status: head.status,
        })?;
    let next = current
        .join(location)
        .map_err(|_| FetchError::InvalidLocation {
            location: location.to_string(),
        })?;
    policy.check(&next)?;
    Ok(next)
}
