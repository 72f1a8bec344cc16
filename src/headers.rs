use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedHeaders {
    pub from: String,
    pub subject: String,
}

/// Line boundaries: `\n`, a bare `\r` and the other Unicode line separators.
/// `\r\n` yields an extra empty line, which never matches a header.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Pull `From:` and `Subject:` out of raw text.
///
/// Any line may carry a header, not just a leading header block, and the
/// last matching line wins.
pub fn parse_headers(text: &str) -> ExtractedHeaders {
    let mut headers = ExtractedHeaders::default();

    for line in text.split(is_line_break) {
        let lower = line.to_lowercase();
        if !(lower.starts_with("from:") || lower.starts_with("subject:")) {
            continue;
        }
        let value = line
            .split_once(':')
            .map(|(_, value)| value.trim().to_string())
            .unwrap_or_default();

        if lower.starts_with("from:") {
            headers.from = value;
        } else {
            headers.subject = value;
        }
    }

    headers
}
