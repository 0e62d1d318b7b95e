use super::DocumentError;

/// Plain text and Markdown are a single unit.
pub fn extract_units(bytes: &[u8]) -> Result<Vec<String>, DocumentError> {
    let text = String::from_utf8(bytes.to_vec())?;
    Ok(vec![text])
}
