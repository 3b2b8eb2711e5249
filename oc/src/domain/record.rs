//! Record, Chunk and CorrectionResult

use serde::{Deserialize, Serialize};

/// One input text unit, keyed by a unique identifier (a date string)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub text: String,
}

impl Record {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }

    /// True when the text carries nothing to correct
    pub fn is_no_data(&self) -> bool {
        super::text::is_no_data(&self.text)
    }

    /// Text with the bracket/quote padding removed
    pub fn payload(&self) -> &str {
        super::text::strip_padding(&self.text)
    }

    /// First characters of the payload, for diagnostics
    pub fn snippet(&self) -> String {
        super::text::snippet(self.payload(), super::text::SNIPPET_CHARS)
    }
}

/// A bounded, contiguous word run of a record's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub record_key: String,
    /// Zero-based position within the record
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Character length (not bytes)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A chunk together with its corrected text
///
/// `corrected_text` never has more characters than `chunk.text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionResult {
    pub chunk: Chunk,
    pub corrected_text: String,
    /// Oracle calls spent, including the successful one
    pub attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_payload_and_no_data() {
        let record = Record::new("1880-01-01", "[\"'The storm passed.'\"]");
        assert_eq!(record.payload(), "The storm passed.");
        assert!(!record.is_no_data());

        assert!(Record::new("1880-01-02", "[]").is_no_data());
        assert!(Record::new("1880-01-03", "  \n ").is_no_data());
    }

    #[test]
    fn test_snippet_skips_padding() {
        let record = Record::new("1880-01-01", "[\"'abc def\"]");
        assert_eq!(record.snippet(), "abc def");
    }

    #[test]
    fn test_chunk_counts() {
        let chunk = Chunk {
            record_key: "k".to_string(),
            index: 0,
            text: "né à Paris".to_string(),
        };
        assert_eq!(chunk.word_count(), 3);
        assert_eq!(chunk.char_len(), 10);
    }
}
