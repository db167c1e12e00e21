//! URL modeling and file-name derivation.
//!
//! Decodes link paths into literal segments, re-encodes them canonically and
//! derives file names that are safe to create on disk.

mod path;
mod sanitize;

pub use path::{build_url, decode_path, file_name_from_segments, split_segments, FALLBACK_LINK_NAME};
pub use sanitize::{sanitize_file_name, scrub_file_name, DEFAULT_DOCUMENT_NAME, MAX_NAME_CHARS};

use url::Url;

use crate::error::FetchError;

/// Parses a user-supplied URL, retrying once with literal spaces replaced by `%20`.
pub fn parse_lenient(input: &str) -> Result<Url, FetchError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FetchError::InvalidInput("empty URL".to_string()));
    }
    match Url::parse(input) {
        Ok(url) => Ok(url),
        Err(first) => {
            tracing::debug!("url parse failed ({}), retrying with encoded spaces", first);
            Url::parse(&input.replace(' ', "%20"))
                .map_err(|e| FetchError::InvalidInput(format!("invalid URL {:?}: {}", input, e)))
        }
    }
}
