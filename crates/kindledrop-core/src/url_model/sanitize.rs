//! File-name sanitization for staged downloads and delivery attachments.

/// Name used when the caller supplies no usable hint.
pub const DEFAULT_DOCUMENT_NAME: &str = "document.pdf";

/// Longest name kept, in characters. The tail is preserved since the extension lives there.
pub const MAX_NAME_CHARS: usize = 150;

/// Replaces path separators (`/`, `\`) and control characters (CR, LF, TAB, NUL, ...) with `_`.
pub fn scrub_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Turns an optional caller hint into a name safe to create inside the staging directory.
///
/// - Absent or blank hint → `document.pdf`
/// - Separators and control characters → `_`
/// - Longer than 150 characters → last 150 characters
pub fn sanitize_file_name(hint: Option<&str>) -> String {
    let hint = match hint {
        Some(h) if !h.trim().is_empty() => h,
        _ => return DEFAULT_DOCUMENT_NAME.to_string(),
    };

    let scrubbed = scrub_file_name(hint);
    let count = scrubbed.chars().count();
    if count <= MAX_NAME_CHARS {
        return scrubbed;
    }
    scrubbed.chars().skip(count - MAX_NAME_CHARS).collect()
}
