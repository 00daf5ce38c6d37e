//! Small text helpers shared across the pipeline

use sha2::{Digest, Sha256};

/// Returns true if the string contains at least one Han character.
///
/// Covers the CJK Unified Ideographs blocks (base, extension A, and the
/// supplementary-plane extensions B-F).
pub fn contains_han(s: &str) -> bool {
    s.chars().any(is_han)
}

fn is_han(c: char) -> bool {
    matches!(
        c,
        '\u{4E00}'..='\u{9FFF}'       // CJK Unified Ideographs
        | '\u{3400}'..='\u{4DBF}'     // Extension A
        | '\u{20000}'..='\u{2A6DF}'   // Extension B
        | '\u{2A700}'..='\u{2EBEF}'   // Extensions C-F
    )
}

/// SHA-256 hex digest of a string, used for deduplication keys.
pub fn hash(s: &str) -> String {
    let digest = Sha256::digest(s.as_bytes());
    hex::encode(digest)
}

/// Shortens a string to at most `max_chars` characters, appending "..." if
/// anything was cut. Used for log output only.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
