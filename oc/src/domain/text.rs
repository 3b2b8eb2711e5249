//! Small text helpers shared by the source, driver and cleaner

/// Characters of text shown next to a failing record's key
pub const SNIPPET_CHARS: usize = 50;

/// Characters stripped from both ends of a raw source field
const PADDING: &[char] = &['[', ']', '"', '\'', ' '];

/// The "no data" sentinel used by the upstream export
pub const NO_DATA_SENTINEL: &str = "[]";

/// True for empty, all-whitespace or `[]` text
pub fn is_no_data(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed == NO_DATA_SENTINEL
}

/// Remove surrounding brackets, quotes and spaces
pub fn strip_padding(text: &str) -> &str {
    text.trim_matches(PADDING)
}

/// Collapse every whitespace run (line breaks included) to one space and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max_chars` characters, never splitting a code point
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_no_data() {
        assert!(is_no_data(""));
        assert!(is_no_data("   \t"));
        assert!(is_no_data("[]"));
        assert!(is_no_data(" [] "));
        assert!(!is_no_data("[ ]x"));
        assert!(!is_no_data("rain"));
    }

    #[test]
    fn test_strip_padding() {
        assert_eq!(strip_padding("['Heavy rain']"), "Heavy rain");
        assert_eq!(strip_padding("\"quoted\""), "quoted");
        assert_eq!(strip_padding("plain"), "plain");
        // Inner punctuation is kept
        assert_eq!(strip_padding("['it's wet']"), "it's wet");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\n b\r\n\tc  "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_snippet_counts_chars() {
        assert_eq!(snippet("ééééé", 3), "ééé");
        assert_eq!(snippet("ab", 50), "ab");
    }
}
