use lopdf::Document;
use tracing::{debug, warn};

use super::DocumentError;

/// Returns the raw text of every page, in page order. Pages whose content
/// cannot be decoded are logged and yield an empty unit.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, DocumentError> {
    let doc = Document::load_mem(bytes).map_err(|e| DocumentError::Pdf(e.to_string()))?;

    let pages = doc.get_pages();
    debug!("Extracting text from {} PDF page(s)", pages.len());

    let units = pages
        .keys()
        .map(|&page_number| match doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping unreadable PDF page {page_number}: {e}");
                String::new()
            }
        })
        .collect();

    Ok(units)
}
