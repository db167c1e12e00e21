//! Error taxonomy for link resolution and bounded download.
//!
//! Every failure is terminal for one fetch attempt; nothing here is retried
//! internally. `ErrorKind` groups variants into the categories callers branch
//! on, and `ErrorClass` is the coarse client / gateway / internal split used
//! at the outer boundary (HTTP status, CLI exit code).

use std::io;
use thiserror::Error;

/// Failure of `GitHubLinkResolver::resolve` or `Downloader::fetch`.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed, even after the space salvage pass.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Resolver rejected the host: only GitHub file links are allowed.
    #[error("unsupported host {0:?}: only GitHub file links are allowed")]
    UnsupportedHost(String),

    /// Downloader rejected the host or scheme of a request target (initial URL or redirect hop).
    #[error("blocked host: {url} ({reason})")]
    BlockedHost { url: String, reason: &'static str },

    /// A `github.com` URL that is not a `/{org}/{repo}/blob/{branch}/{path}` file link.
    #[error("unsupported GitHub URL format, expected a file 'blob' link: {0}")]
    UnsupportedFormat(String),

    /// File name has no extension or one outside the allowed set.
    #[error("unsupported file extension {0:?} (allowed: pdf, epub, mobi, azw3)")]
    UnsupportedExtension(String),

    /// Declared `Content-Length` or streamed byte count exceeded the budget.
    #[error("{}", too_large_message(*limit, *received, *declared))]
    TooLarge {
        limit: u64,
        received: u64,
        declared: bool,
    },

    /// A 3xx response without a `Location` header.
    #[error("redirect (HTTP {status}) without Location header")]
    MissingLocation { status: u32 },

    /// Hop limit reached while the server kept redirecting.
    #[error("too many redirects: gave up after {attempts} attempts")]
    TooManyRedirects { attempts: u32 },

    /// `Location` could not be resolved against the current URL.
    #[error("redirect Location could not be resolved: {location}")]
    InvalidLocation { location: String },

    /// Terminal response (after redirects) was not 2xx.
    #[error("download failed with HTTP {status} for {url}")]
    HttpStatus { status: u32, url: String },

    /// libcurl failure: connect, TLS, timeout, reset.
    #[error("transport error: {0}")]
    Transport(#[from] curl::Error),

    /// The staged bytes do not start like a document of the named type
    /// (an HTML error page, a Git LFS pointer, a renamed archive).
    #[error("{file_name} is not a valid {format} document")]
    ContentMismatch {
        file_name: String,
        format: &'static str,
    },

    /// Staging directory or payload file could not be created or written.
    #[error("storage error: {0}")]
    Storage(#[from] io::Error),
}

fn too_large_message(limit: u64, received: u64, declared: bool) -> String {
    if declared {
        format!(
            "file too large (content-length {} bytes), max allowed is {} bytes",
            received, limit
        )
    } else {
        format!("file too large (streamed > {} bytes)", limit)
    }
}

/// Taxonomy of failures, one per distinguishable cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    /// Host not allowlisted, whether caught by the resolver or the downloader.
    UnsupportedHost,
    UnsupportedFormat,
    UnsupportedExtension,
    TooLarge,
    Redirect,
    Transport,
    ContentMismatch,
    Storage,
}

/// Who is at fault, for the boundary mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed or unsupported input from the caller.
    Client,
    /// The remote host misbehaved or could not be reached.
    Gateway,
    /// Anything unanticipated (local I/O, bugs).
    Internal,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::InvalidInput(_) => ErrorKind::InvalidInput,
            FetchError::UnsupportedHost(_) | FetchError::BlockedHost { .. } => {
                ErrorKind::UnsupportedHost
            }
            FetchError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            FetchError::UnsupportedExtension(_) => ErrorKind::UnsupportedExtension,
            FetchError::TooLarge { .. } => ErrorKind::TooLarge,
            FetchError::MissingLocation { .. }
            | FetchError::TooManyRedirects { .. }
            | FetchError::InvalidLocation { .. } => ErrorKind::Redirect,
            FetchError::HttpStatus { .. } | FetchError::Transport(_) => ErrorKind::Transport,
            FetchError::ContentMismatch { .. } => ErrorKind::ContentMismatch,
            FetchError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn class(&self) -> ErrorClass {
        self.kind().class()
    }
}

impl ErrorKind {
    pub fn class(self) -> ErrorClass {
        match self {
            ErrorKind::InvalidInput
            | ErrorKind::UnsupportedHost
            | ErrorKind::UnsupportedFormat
            | ErrorKind::UnsupportedExtension => ErrorClass::Client,
            ErrorKind::TooLarge
            | ErrorKind::Redirect
            | ErrorKind::Transport
            | ErrorKind::ContentMismatch => ErrorClass::Gateway,
            ErrorKind::Storage => ErrorClass::Internal,
        }
    }
}

impl ErrorClass {
    /// HTTP status a request-handling layer would answer with.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorClass::Client => 400,
            ErrorClass::Gateway => 502,
            ErrorClass::Internal => 500,
        }
    }
}
