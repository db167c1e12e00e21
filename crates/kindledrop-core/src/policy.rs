//! Host, scheme and file-type allowlists shared by the resolver and the downloader.
//!
//! Both components take the same `HostPolicy` so that resolution can only
//! ever produce hosts the downloader will itself accept.

use crate::error::FetchError;
use url::Url;

pub const GITHUB_HOST: &str = "github.com";
pub const RAW_HOST: &str = "raw.githubusercontent.com";
pub const SECURE_SCHEME: &str = "https";

/// Hosts documents may be fetched from.
pub const ALLOWED_HOSTS: &[&str] = &[GITHUB_HOST, RAW_HOST];

/// Document types accepted for delivery (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "epub", "mobi", "azw3"];

/// Scheme and host allowlist applied to every request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPolicy {
    scheme: String,
    hosts: Vec<String>,
}

impl HostPolicy {
    /// Production policy: `https` to GitHub hosts only.
    pub fn github() -> Self {
        Self::new(SECURE_SCHEME, ALLOWED_HOSTS.iter().copied())
    }

    /// Custom policy. Only meant for pointing the downloader at a loopback
    /// server in tests; production code uses `github()`.
    pub fn new<I, S>(scheme: &str, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            scheme: scheme.to_ascii_lowercase(),
            hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn allows_host(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| h.eq_ignore_ascii_case(host))
    }

    /// Validates scheme and host of a request target.
    pub fn check(&self, url: &Url) -> Result<(), FetchError> {
        let allowed = url.host_str().map(|h| self.allows_host(h)).unwrap_or(false);
        if !allowed {
            return Err(FetchError::BlockedHost {
                url: url.to_string(),
                reason: "host not allowed",
            });
        }
        if !url.scheme().eq_ignore_ascii_case(&self.scheme) {
            return Err(FetchError::BlockedHost {
                url: url.to_string(),
                reason: "insecure scheme",
            });
        }
        Ok(())
    }
}

impl Default for HostPolicy {
    fn default() -> Self {
        Self::github()
    }
}

/// Rejects file names without an extension or with one outside `ALLOWED_EXTENSIONS`.
pub fn check_extension(file_name: &str) -> Result<(), FetchError> {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => return Err(FetchError::UnsupportedExtension(String::new())),
    };
    if ALLOWED_EXTENSIONS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    {
        Ok(())
    } else {
        Err(FetchError::UnsupportedExtension(ext.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn github_policy_accepts_both_hosts_over_https() {
        let p = HostPolicy::github();
        assert!(p.check(&url("https://github.com/o/r/blob/main/a.pdf")).is_ok());
        assert!(p
            .check(&url("https://raw.githubusercontent.com/o/r/main/a.pdf"))
            .is_ok());
        assert!(p.check(&url("https://RAW.GitHubUserContent.com/x.pdf")).is_ok());
    }

    #[test]
    fn rejects_other_hosts_and_plain_http() {
        let p = HostPolicy::github();
        let err = p.check(&url("https://gitlab.com/a.pdf")).unwrap_err();
        assert!(matches!(err, FetchError::BlockedHost { reason: "host not allowed", .. }));
        let err = p
            .check(&url("http://raw.githubusercontent.com/o/r/main/a.pdf"))
            .unwrap_err();
        assert!(matches!(err, FetchError::BlockedHost { reason: "insecure scheme", .. }));
        // Lookalike suffix must not pass.
        assert!(p.check(&url("https://evilgithub.com/a.pdf")).is_err());
        assert!(p.check(&url("https://github.com.evil.net/a.pdf")).is_err());
    }

    #[test]
    fn rejects_hostless_urls() {
        let p = HostPolicy::github();
        assert!(p.check(&url("file:///etc/passwd")).is_err());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(check_extension("book.PDF").is_ok());
        assert!(check_extension("book.epub").is_ok());
        assert!(check_extension("novel.final.Azw3").is_ok());
        assert!(check_extension("x.mobi").is_ok());
    }

    #[test]
    fn extension_check_rejects_missing_and_foreign() {
        assert!(matches!(
            check_extension("README"),
            Err(FetchError::UnsupportedExtension(e)) if e.is_empty()
        ));
        assert!(matches!(
            check_extension("setup.EXE"),
            Err(FetchError::UnsupportedExtension(e)) if e == "exe"
        ));
        assert!(check_extension("book.pdf.").is_err());
    }
}
