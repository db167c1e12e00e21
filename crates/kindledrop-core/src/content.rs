//! Payload signature check run on a staged download before it is handed on.
//!
//! The extension policy only looks at the name. A raw link can still serve
//! something else under that name: an HTML error page, a Git LFS pointer
//! file, a renamed archive. Those are rejected here by their leading bytes.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::FetchError;

/// Bytes read from the start of the payload.
pub const SNIFF_LEN: usize = 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const EPUB_MIMETYPE: &[u8] = b"application/epub+zip";
/// PalmDB type and creator fields sit at offset 60 of the database header.
const PALMDB_TYPE_OFFSET: usize = 60;
const PALMDB_TYPES: &[&[u8]] = &[b"BOOKMOBI", b"TEXtREAd"];

/// Document family implied by an allowed extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Epub,
    /// `.mobi` and `.azw3`; both are PalmDB containers.
    Mobipocket,
}

impl DocumentFormat {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "epub" => Some(DocumentFormat::Epub),
            "mobi" | "azw3" => Some(DocumentFormat::Mobipocket),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Epub => "EPUB",
            DocumentFormat::Mobipocket => "Mobipocket",
        }
    }

    /// True when `head` (the first bytes of a file) carries this format's signature.
    ///
    /// PDF readers accept the header anywhere in the first KiB, so the PDF
    /// check scans rather than anchoring at offset 0.
    pub fn matches(self, head: &[u8]) -> bool {
        match self {
            DocumentFormat::Pdf => contains(head, PDF_MAGIC),
            DocumentFormat::Epub => head.starts_with(ZIP_MAGIC) && contains(head, EPUB_MIMETYPE),
            DocumentFormat::Mobipocket => head
                .get(PALMDB_TYPE_OFFSET..PALMDB_TYPE_OFFSET + 8)
                .map_or(false, |t| PALMDB_TYPES.contains(&t)),
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Checks the file at `path` against the format its `file_name` claims.
pub fn verify_payload(path: &Path, file_name: &str) -> Result<DocumentFormat, FetchError> {
    let format = DocumentFormat::from_file_name(file_name)
        .ok_or_else(|| FetchError::UnsupportedExtension(file_name.to_string()))?;

    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)?;

    if !format.matches(&head) {
        tracing::debug!(
            "{} rejected: first bytes {:?}",
            file_name,
            String::from_utf8_lossy(&head[..head.len().min(32)])
        );
        return Err(FetchError::ContentMismatch {
            file_name: file_name.to_string(),
            format: format.label(),
        });
    }
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ALLOWED_EXTENSIONS;
    use std::fs;

    fn palmdb(kind: &[u8; 8]) -> Vec<u8> {
        let mut db = vec![0u8; 78];
        db[..8].copy_from_slice(b"My_Book\0");
        db[PALMDB_TYPE_OFFSET..PALMDB_TYPE_OFFSET + 8].copy_from_slice(kind);
        db
    }

    fn epub() -> Vec<u8> {
        let mut zip = b"PK\x03\x04\x14\x00\x00\x00\x00\x00".to_vec();
        zip.resize(30, 0);
        zip.extend_from_slice(b"mimetypeapplication/epub+zip");
        zip
    }

    #[test]
    fn every_allowed_extension_has_a_format() {
        for ext in ALLOWED_EXTENSIONS {
            assert!(
                DocumentFormat::from_file_name(&format!("book.{}", ext)).is_some(),
                "{ext}"
            );
        }
        assert_eq!(
            DocumentFormat::from_file_name("Book.AZW3"),
            Some(DocumentFormat::Mobipocket)
        );
        assert_eq!(DocumentFormat::from_file_name("README"), None);
    }

    #[test]
    fn pdf_header_may_follow_leading_junk() {
        assert!(DocumentFormat::Pdf.matches(b"%PDF-1.7\n%\xe2\xe3"));
        assert!(DocumentFormat::Pdf.matches(b"\xef\xbb\xbf\r\n%PDF-1.4"));
        assert!(!DocumentFormat::Pdf.matches(b"<!DOCTYPE html><title>404</title>"));
        assert!(!DocumentFormat::Pdf.matches(b""));
    }

    #[test]
    fn epub_needs_zip_and_mimetype() {
        assert!(DocumentFormat::Epub.matches(&epub()));
        let mut plain_zip = b"PK\x03\x04".to_vec();
        plain_zip.extend_from_slice(b"word/document.xml");
        assert!(!DocumentFormat::Epub.matches(&plain_zip));
        assert!(!DocumentFormat::Epub.matches(b"application/epub+zip"));
    }

    #[test]
    fn mobipocket_reads_palmdb_type() {
        assert!(DocumentFormat::Mobipocket.matches(&palmdb(b"BOOKMOBI")));
        assert!(DocumentFormat::Mobipocket.matches(&palmdb(b"TEXtREAd")));
        assert!(!DocumentFormat::Mobipocket.matches(&palmdb(b"DATAPLKR")));
        assert!(!DocumentFormat::Mobipocket.matches(b"BOOKMOBI"));
    }

    #[test]
    fn verify_payload_reads_file_head() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.pdf");
        let mut body = b"%PDF-1.7\n".to_vec();
        body.resize(64 * 1024, b'x');
        fs::write(&path, &body).unwrap();
        assert_eq!(verify_payload(&path, "book.pdf").unwrap(), DocumentFormat::Pdf);
    }

    #[test]
    fn lfs_pointer_is_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.pdf");
        fs::write(
            &path,
            "oid sha256:4d7a214614ab2935c943f9e0ff69d22eadbb8f32b1258daaa5e2ca24d17e2393\nsize 12345\n",
        )
        .unwrap();
        let err = verify_payload(&path, "book.pdf").unwrap_err();
        match err {
            FetchError::ContentMismatch { file_name, format } => {
                assert_eq!(file_name, "book.pdf");
                assert_eq!(format, "PDF");
            }
            other => panic!("expected ContentMismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_payload(&dir.path().join("gone.epub"), "gone.epub").unwrap_err();
        assert!(matches!(err, FetchError::Storage(_)));
    }
}
