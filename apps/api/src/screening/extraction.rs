//! Uploaded document → cleaned plain text.

use std::panic;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::docx::extract_docx;
use crate::matching::panic_message;

pub const MAX_DOCUMENT_BYTES: usize = 50 * 1024 * 1024;

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported document type '{0}' (expected PDF, DOCX or plain text)")]
    UnsupportedType(String),

    #[error("Document is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Could not read DOCX: {0}")]
    Docx(String),

    #[error("Document contains no text")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

static CONTROL_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("valid regex")
});

/// Extracts and cleans the text of an uploaded résumé.
///
/// The content type wins when it is recognised; otherwise the file extension
/// decides.
pub fn extract_text(
    bytes: &[u8],
    file_name: &str,
    content_type: Option<&str>,
) -> Result<String, ExtractionError> {
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(ExtractionError::TooLarge {
            size: bytes.len(),
            limit: MAX_DOCUMENT_BYTES,
        });
    }

    let raw = match detect_kind(file_name, content_type)? {
        DocumentKind::Pdf => extract_pdf(bytes)?,
        DocumentKind::Docx => extract_docx(bytes)?,
        DocumentKind::PlainText => String::from_utf8_lossy(bytes).into_owned(),
    };

    let cleaned = clean_text(&raw);
    if cleaned.is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(cleaned)
}

/// pdf-extract panics on some malformed files; those become `Pdf` errors.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(result) => result.map_err(|e| ExtractionError::Pdf(e.to_string())),
        Err(payload) => Err(ExtractionError::Pdf(panic_message(payload.as_ref()))),
    }
}

fn detect_kind(file_name: &str, content_type: Option<&str>) -> Result<DocumentKind, ExtractionError> {
    let mime = content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .unwrap_or_default();
    match mime.as_str() {
        "application/pdf" => return Ok(DocumentKind::Pdf),
        DOCX_CONTENT_TYPE => return Ok(DocumentKind::Docx),
        "text/plain" => return Ok(DocumentKind::PlainText),
        _ => {}
    }

    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        Ok(DocumentKind::Pdf)
    } else if lower.ends_with(".docx") {
        Ok(DocumentKind::Docx)
    } else if lower.ends_with(".txt") {
        Ok(DocumentKind::PlainText)
    } else if mime.is_empty() {
        Err(ExtractionError::UnsupportedType(file_name.to_string()))
    } else {
        Err(ExtractionError::UnsupportedType(mime))
    }
}

/// Unifies newlines, strips control characters (tabs and newlines survive),
/// trailing blanks and empty lines.
pub fn clean_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let stripped = CONTROL_CHARS_RE.replace_all(&unified, "");
    stripped
        .lines()
        .map(|line| line.trim_end_matches([' ', '\t']))
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::docx::test_support::{docx_with_body, paragraph};

    #[test]
    fn test_clean_text_normalises_lines() {
        let raw = "John Doe  \r\n\r\n\tPython\x07 developer\t\rline\x00 three\n\n";
        assert_eq!(clean_text(raw), "John Doe\n\tPython developer\nline three");
    }

    #[test]
    fn test_clean_text_of_blank_input_is_empty() {
        assert_eq!(clean_text(" \n\t\r\n "), "");
    }

    #[test]
    fn test_plain_text_by_extension() {
        let text = extract_text(b"Jane Roe\npython", "cv.TXT", None).unwrap();
        assert_eq!(text, "Jane Roe\npython");
    }

    #[test]
    fn test_content_type_wins_over_extension() {
        let text = extract_text(b"hello", "cv.bin", Some("text/plain; charset=utf-8")).unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_unsupported_type_is_rejected() {
        let err = extract_text(b"{\\rtf1}", "cv.rtf", Some("application/rtf")).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedType(_)));
        let err = extract_text(b"PK..", "cv.odt", None).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedType(_)));
        let err = extract_text(b"x", "cv", None).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedType(_)));
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let err = extract_text(b" \n \n", "cv.txt", None).unwrap_err();
        assert!(matches!(err, ExtractionError::Empty));
    }

    #[test]
    fn test_broken_pdf_is_an_error() {
        let err = extract_text(b"not really a pdf", "cv.pdf", None).unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }

    #[test]
    fn test_docx_by_content_type_and_extension() {
        let bytes = docx_with_body(&format!(
            "{}{}<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
            paragraph("Jane Roe  "),
            paragraph(""),
            paragraph("Languages"),
            paragraph("English"),
        ));

        let by_type = extract_text(&bytes, "upload", Some(DOCX_CONTENT_TYPE)).unwrap();
        assert_eq!(by_type, "Jane Roe\nLanguages | English");
        let by_extension = extract_text(&bytes, "CV.DOCX", Some("application/octet-stream")).unwrap();
        assert_eq!(by_extension, by_type);
    }

    #[test]
    fn test_broken_docx_is_an_error() {
        let err = extract_text(b"PK", "cv.docx", None).unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(_)));
    }

    #[test]
    fn test_docx_without_text_is_empty() {
        let bytes = docx_with_body("<w:p/>");
        let err = extract_text(&bytes, "cv.docx", None).unwrap_err();
        assert!(matches!(err, ExtractionError::Empty));
    }

    #[test]
    fn test_oversize_document_is_rejected() {
        let bytes = vec![b'a'; MAX_DOCUMENT_BYTES + 1];
        let err = extract_text(&bytes, "cv.txt", None).unwrap_err();
        assert!(matches!(err, ExtractionError::TooLarge { .. }));
    }
}
