use std::io::Read;
use std::path::Path;

/// Decode bytes as UTF-8, dropping anything that is not valid.
pub fn decode_permissive(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

pub fn read_email_file(path: impl AsRef<Path>) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_permissive(&bytes))
}

pub fn read_email_stdin() -> std::io::Result<String> {
    let mut bytes = Vec::new();
    std::io::stdin().read_to_end(&mut bytes)?;
    Ok(decode_permissive(&bytes))
}

/// Trimmed scan input, or `None` when there is nothing to scan.
pub fn prepare_input(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
