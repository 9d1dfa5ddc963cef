//! Text decoding with a legacy single-byte fallback.

use std::borrow::Cow;

use encoding_rs::{UTF_8, WINDOWS_1252};

/// Encoding a file was successfully decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Windows1252,
}

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Decodes raw file bytes, strict UTF-8 first and Windows-1252 second.
///
/// A leading byte-order mark is dropped. Returns `None` only when both
/// attempts report malformed input.
pub fn decode_text(bytes: &[u8]) -> Option<(String, TextEncoding)> {
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(body) {
        return Some((text.into_owned(), TextEncoding::Utf8));
    }

    let (text, had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
    if had_errors {
        return None;
    }
    tracing::debug!("UTF-8 decode failed, fell back to windows-1252");
    Some((text.into_owned(), TextEncoding::Windows1252))
}

/// Renders UTF-8 bytes as they look when misread as Windows-1252.
///
/// This is how double-encoded text ends up in legacy extracts, and the
/// default repair table is built from it.
pub fn misread_as_windows_1252(original: &str) -> Cow<'_, str> {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(original.as_bytes());
    text
}
