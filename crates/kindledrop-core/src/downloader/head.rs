//! Parse raw response header lines into the fields the downloader inspects.

/// Status and the headers that drive redirect and size decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u32,
    /// `Content-Length`, when present and numeric.
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub location: Option<String>,
}

impl ResponseHead {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Interim (1xx) heads are followed by the real one.
    pub fn is_interim(&self) -> bool {
        (100..200).contains(&self.status)
    }
}

/// Parses the status from an `HTTP/x.y NNN reason` line.
pub(crate) fn parse_status_line(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

/// Builds a `ResponseHead` from the lines of one response (status line first).
/// Returns `None` when there is no status line.
pub(crate) fn parse_head(lines: &[String]) -> Option<ResponseHead> {
    let mut iter = lines.iter();
    let status = parse_status_line(iter.next()?.trim())?;
    let mut head = ResponseHead {
        status,
        ..ResponseHead::default()
    };

    for line in iter {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                head.content_length = value.parse::<u64>().ok();
            } else if name.eq_ignore_ascii_case("content-type") {
                head.content_type = Some(value.to_string());
            } else if name.eq_ignore_ascii_case("location") && !value.is_empty() {
                head.location = Some(value.to_string());
            }
        }
    }

    Some(head)
}
