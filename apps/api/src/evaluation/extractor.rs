//! Text Extractor — turns an uploaded resume into plain text.
//!
//! PDFs go through `pdf-extract` on the blocking pool. Plain-text uploads are
//! only accepted when the service runs with `ACCEPT_ANY_FILE_TYPE=true`.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::evaluation::submission::UploadedResume;

const PDF_MAGIC: &[u8] = b"%PDF";
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "text"];

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("no text could be extracted")]
    Empty,

    #[error("PDF could not be read: {0}")]
    Pdf(String),

    #[error("file is not valid UTF-8 text")]
    Encoding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Pdf,
    Text,
    Other,
}

/// Extraction settings taken from `Config`.
#[derive(Debug, Clone, Copy)]
pub struct ExtractorOptions {
    pub accept_any_file_type: bool,
    pub max_upload_bytes: usize,
}

/// Extracts the text of every page, in page order, as one string.
pub async fn extract_text(
    resume: &UploadedResume,
    options: ExtractorOptions,
) -> Result<String, ExtractionError> {
    if resume.bytes.len() > options.max_upload_bytes {
        return Err(ExtractionError::TooLarge {
            size: resume.bytes.len(),
            limit: options.max_upload_bytes,
        });
    }

    let kind = detect_kind(resume);
    debug!("Extracting '{}' as {:?}", resume.file_name, kind);

    let text = match (kind, options.accept_any_file_type) {
        (FileKind::Pdf, _) => {
            let bytes = resume.bytes.clone();
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                // a panic inside the PDF parser surfaces here as a JoinError
                .map_err(|e| ExtractionError::Pdf(format!("parser aborted: {e}")))?
                .map_err(|e| ExtractionError::Pdf(e.to_string()))?
        }
        (FileKind::Text, true) => String::from_utf8(resume.bytes.to_vec())
            .map_err(|_| ExtractionError::Encoding)?,
        _ => return Err(ExtractionError::UnsupportedFormat(describe(resume))),
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(text)
}

/// First e-mail address in the resume text, for the "Email ID" column.
pub fn find_email(text: &str) -> Option<String> {
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}")
            .expect("email pattern is valid")
    });
    re.find(text).map(|m| m.as_str().to_string())
}

fn detect_kind(resume: &UploadedResume) -> FileKind {
    if resume.bytes.starts_with(PDF_MAGIC) {
        return FileKind::Pdf;
    }

    let extension = extension_of(&resume.file_name);
    let content_type = resume.content_type.as_deref().unwrap_or("");

    if extension == "pdf" || content_type == "application/pdf" {
        FileKind::Pdf
    } else if TEXT_EXTENSIONS.contains(&extension.as_str()) || content_type.starts_with("text/") {
        FileKind::Text
    } else {
        FileKind::Other
    }
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn describe(resume: &UploadedResume) -> String {
    match (&resume.content_type, extension_of(&resume.file_name)) {
        (Some(ct), _) if !ct.is_empty() => ct.clone(),
        (_, ext) if !ext.is_empty() => format!(".{ext}"),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn upload(name: &str, content_type: Option<&str>, bytes: &'static [u8]) -> UploadedResume {
        UploadedResume {
            file_name: name.to_string(),
            content_type: content_type.map(String::from),
            bytes: Bytes::from_static(bytes),
        }
    }

    fn options(accept_any_file_type: bool) -> ExtractorOptions {
        ExtractorOptions {
            accept_any_file_type,
            max_upload_bytes: 1024,
        }
    }

    #[test]
    fn test_detect_kind_prefers_magic_bytes() {
        let resume = upload("resume.bin", None, b"%PDF-1.7 ...");
        assert_eq!(detect_kind(&resume), FileKind::Pdf);
    }

    #[test]
    fn test_detect_kind_by_extension_and_content_type() {
        assert_eq!(detect_kind(&upload("CV.PDF", None, b"x")), FileKind::Pdf);
        assert_eq!(detect_kind(&upload("cv.txt", None, b"x")), FileKind::Text);
        assert_eq!(
            detect_kind(&upload("cv", Some("text/plain"), b"x")),
            FileKind::Text
        );
        assert_eq!(detect_kind(&upload("cv.docx", None, b"x")), FileKind::Other);
    }

    #[test]
    fn test_find_email_returns_first_address() {
        let text = "Jane Doe\nContact: jane.doe+jobs@mail.example.com | alt@example.org";
        assert_eq!(
            find_email(text).as_deref(),
            Some("jane.doe+jobs@mail.example.com")
        );
        assert_eq!(find_email("no contact details"), None);
    }

    #[tokio::test]
    async fn test_plain_text_accepted_when_any_type_allowed() {
        let resume = upload("cv.txt", Some("text/plain"), b"Go, PostgreSQL, Kafka");
        let text = extract_text(&resume, options(true)).await.unwrap();
        assert_eq!(text, "Go, PostgreSQL, Kafka");
    }

    #[tokio::test]
    async fn test_plain_text_rejected_in_pdf_only_mode() {
        let resume = upload("cv.txt", Some("text/plain"), b"Go");
        let err = extract_text(&resume, options(false)).await.unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(ref t) if t == "text/plain"));
    }

    #[tokio::test]
    async fn test_unknown_binary_is_unsupported() {
        let resume = upload("cv.docx", None, b"PK\x03\x04");
        let err = extract_text(&resume, options(true)).await.unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(ref t) if t == ".docx"));
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_before_parsing() {
        let resume = upload("cv.txt", None, &[b'a'; 2048]);
        let err = extract_text(&resume, options(true)).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::TooLarge {
                size: 2048,
                limit: 1024
            }
        ));
    }

    #[tokio::test]
    async fn test_whitespace_only_text_is_empty() {
        let resume = upload("cv.txt", None, b"  \n\t ");
        let err = extract_text(&resume, options(true)).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Empty));
    }

    #[tokio::test]
    async fn test_invalid_utf8_text_fails() {
        let resume = upload("cv.txt", None, &[0xff, 0xfe, 0x41]);
        let err = extract_text(&resume, options(true)).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Encoding));
    }

    const TWO_PAGE_PDF: &[u8] = include_bytes!("testdata/two_pages.pdf");

    #[tokio::test]
    async fn test_pdf_pages_are_extracted_in_order() {
        let resume = upload("cv.pdf", Some("application/pdf"), TWO_PAGE_PDF);
        let options = ExtractorOptions {
            accept_any_file_type: false,
            max_upload_bytes: 1024 * 1024,
        };
        let text = extract_text(&resume, options).await.unwrap();

        let words: Vec<&str> = text.split_whitespace().collect();
        let first = words.iter().position(|w| *w == "FirstPageMarker").unwrap();
        let second = words.iter().position(|w| *w == "SecondPageMarker").unwrap();
        assert!(first < second);
        assert!(words.contains(&"PostgreSQL"));
    }

    #[tokio::test]
    async fn test_pdf_detected_by_magic_despite_extension() {
        let resume = upload("cv.bin", None, TWO_PAGE_PDF);
        let options = ExtractorOptions {
            accept_any_file_type: false,
            max_upload_bytes: 1024 * 1024,
        };
        let text = extract_text(&resume, options).await.unwrap();
        assert!(text.contains("FirstPageMarker"));
    }

    #[tokio::test]
    async fn test_garbage_pdf_reports_error_instead_of_panicking() {
        let resume = upload("cv.pdf", Some("application/pdf"), b"%PDF-1.4 not really a pdf");
        let err = extract_text(&resume, options(false)).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Pdf(_) | ExtractionError::Empty
        ));
    }
}
