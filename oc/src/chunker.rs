//! Word-bounded chunking
//!
//! Splits a record's text on whitespace and groups consecutive words into
//! chunks of at most `word_limit` words. Boundaries ignore sentences, so a
//! chunk may end mid-clause; that keeps every oracle call size-bounded.
//!
//! Joining the chunk texts with single spaces, in index order, reproduces
//! the input with its whitespace normalized.

use tracing::debug;

use crate::domain::{Chunk, Record};

/// Splits records into ordered, reconstructable chunks
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    word_limit: usize,
}

impl Chunker {
    /// A limit of zero is treated as one word per chunk
    pub fn new(word_limit: usize) -> Self {
        Self {
            word_limit: word_limit.max(1),
        }
    }

    pub fn word_limit(&self) -> usize {
        self.word_limit
    }

    /// Chunk a record's payload (padding already stripped by the caller)
    pub fn split(&self, record_key: &str, text: &str) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = split_words(text, self.word_limit)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk {
                record_key: record_key.to_string(),
                index,
                text,
            })
            .collect();
        debug!(%record_key, chunks = chunks.len(), word_limit = self.word_limit, "Chunker::split: done");
        chunks
    }

    pub fn split_record(&self, record: &Record) -> Vec<Chunk> {
        self.split(&record.key, record.payload())
    }
}

/// Group whitespace-separated words into runs of at most `limit`
///
/// Always returns at least one element; text with no words yields a single
/// empty string.
pub fn split_words(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.len() <= limit {
        return vec![words.join(" ")];
    }

    words.chunks(limit).map(|group| group.join(" ")).collect()
}
