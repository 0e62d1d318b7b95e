//! Text extraction for uploaded documents.
//!
//! Every format is reduced to a list of units (PDF pages, or the whole file for
//! plain text). Each unit has its whitespace runs collapsed to single spaces and
//! the non-empty units are joined with a single space.

mod pdf;
mod txt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("File is not valid UTF-8 text: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Extract the visible text of a document, dispatching on the file extension.
///
/// Returns an empty string when the document parsed but no unit carried text.
/// Callers must treat that as "no readable text" rather than as success.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String, DocumentError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    let units = match ext.as_str() {
        "pdf" => pdf::extract_pages(bytes)?,
        "txt" | "text" | "md" | "markdown" => txt::extract_units(bytes)?,
        other => return Err(DocumentError::UnsupportedType(other.to_string())),
    };

    Ok(join_units(units))
}

/// Collapses every whitespace run in `text` to one space and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn join_units(units: Vec<String>) -> String {
    units
        .iter()
        .map(|u| collapse_whitespace(u))
        .filter(|u| !u.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_whitespace_squeezes_runs() {
        assert_eq!(collapse_whitespace("  Invoice\n\n total:\t $500  "), "Invoice total: $500");
        assert_eq!(collapse_whitespace(" \n\t "), "");
    }

    #[test]
    fn join_units_skips_empty_units() {
        let units = vec!["first  page".to_string(), "   ".to_string(), "third\npage".to_string()];
        assert_eq!(join_units(units), "first page third page");
    }

    #[test]
    fn pdf_pages_are_joined_with_single_space() {
        let bytes = test_pdf::build(&[Some("Invoice total: $500"), Some("Due   in 30 days")]);
        let text = extract_text(&bytes, "invoice.PDF").unwrap();
        assert!(text.contains("Invoice total: $500"));
        assert!(text.contains("Due in 30 days"));
        assert!(!text.contains("  "));
    }

    #[test]
    fn pdf_without_text_yields_empty_string() {
        let bytes = test_pdf::build(&[None, None]);
        assert_eq!(extract_text(&bytes, "scan.pdf").unwrap(), "");
    }

    #[test]
    fn corrupt_pdf_is_a_parse_error() {
        let result = extract_text(b"this is not a pdf at all", "broken.pdf");
        assert!(matches!(result, Err(DocumentError::Pdf(_))));
    }

    #[test]
    fn plain_text_is_normalized() {
        let text = extract_text(b"# Notes\n\nline one\r\nline   two\n", "notes.md").unwrap();
        assert_eq!(text, "# Notes line one line two");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let result = extract_text(b"PK\x03\x04", "report.docx");
        assert!(matches!(result, Err(DocumentError::UnsupportedType(ref ext)) if ext == "docx"));

        let result = extract_text(b"data", "no_extension");
        assert!(matches!(result, Err(DocumentError::UnsupportedType(ref ext)) if ext.is_empty()));
    }
}
