//! Path decoding and segment re-encoding.

use url::Url;

use super::sanitize::scrub_file_name;

/// Name used when a link path has no usable final segment.
pub const FALLBACK_LINK_NAME: &str = "document";

/// Percent-decodes a URL path as UTF-8.
///
/// Malformed escapes are kept verbatim and invalid UTF-8 is replaced lossily.
/// `+` stays a literal plus (it only means space in form-encoded queries).
pub fn decode_path(input: &str) -> String {
    let mut out = Vec::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%' {
            if let (Some(high), Some(low)) = (
                bytes.get(i + 1).copied().and_then(hex_digit),
                bytes.get(i + 2).copied().and_then(hex_digit),
            ) {
                out.push(high << 4 | low);
                i += 3;
                continue;
            }
        }
        out.push(b);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Splits a decoded path into its segments, dropping the leading empty one
/// and any trailing empty ones (`/a/b/` → `["a", "b"]`). Interior empty
/// segments are kept so positional shapes stay intact.
pub fn split_segments(decoded_path: &str) -> Vec<&str> {
    let trimmed = decoded_path.trim_start_matches('/').trim_end_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').collect()
}

/// Final non-empty segment, scrubbed of separators and control characters.
/// Falls back to `document` when the path has none.
pub fn file_name_from_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .rev()
        .find(|s| !s.is_empty())
        .map(|s| scrub_file_name(s))
        .unwrap_or_else(|| FALLBACK_LINK_NAME.to_string())
}

/// Builds `https://{host}/{seg}/{seg}...` with every non-empty segment percent-encoded
/// (space as `%20`; `/`, `%`, `?`, `#` escaped) and `query` re-attached as given.
pub fn build_url<'a, I>(host: &str, segments: I, query: Option<&str>) -> Option<Url>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = Url::parse(&format!("https://{}/", host)).ok()?;
    url.path_segments_mut()
        .ok()?
        .clear()
        .extend(segments.into_iter().filter(|s| !s.is_empty()));
    match query {
        Some(q) if !q.trim().is_empty() => url.set_query(Some(q)),
        _ => url.set_query(None),
    }
    Some(url)
}
