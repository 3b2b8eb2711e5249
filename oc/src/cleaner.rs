//! Regex pre-cleaning of raw OCR exports
//!
//! Produces the `*_regex_cleaned.csv` files the correction pipeline reads.
//! Rules run in a fixed order; see [`Cleaner::clean`].

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::oracle::SENTENCE_ENDINGS;
use crate::source::{CsvSource, KEY_COLUMN, SourceError, TEXT_COLUMN};

/// Rows kept in test mode
pub const TEST_ROWS: usize = 5;

/// Rows shown in the test-mode preview
pub const PREVIEW_ROWS: usize = 3;

/// Punctuation whose repeated runs collapse to one mark
const REPEATABLE_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"', '`'];

#[derive(Debug, Error)]
pub enum CleanError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Compiled cleaning rules
#[derive(Debug, Clone)]
pub struct Cleaner {
    whitespace: Regex,
    stars: Regex,
    lone_zero: Regex,
    lone_one: Regex,
    lone_five: Regex,
    non_ascii: Regex,
    leading_non_word: Regex,
    comma_runs: Regex,
}

impl Cleaner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            whitespace: Regex::new(r"\s+")?,
            stars: Regex::new(r"\*+")?,
            lone_zero: Regex::new(r"\b0\b")?,
            lone_one: Regex::new(r"\b1\b")?,
            lone_five: Regex::new(r"\b5\b")?,
            non_ascii: Regex::new(r"[^\x00-\x7F]+")?,
            leading_non_word: Regex::new(r"^\W")?,
            comma_runs: Regex::new(r",{2,}")?,
        })
    }

    /// Apply every rule, in order:
    ///
    /// 1. collapse whitespace runs to one space and trim
    /// 2. delete `*`
    /// 3. standalone `0`, `1`, `5` become `O`, `I`, `S`
    /// 4. collapse runs of the same punctuation mark
    /// 5. drop non-ASCII characters
    /// 6. drop one leading non-word character
    /// 7. collapse comma runs
    pub fn clean(&self, text: &str) -> String {
        let text = self.whitespace.replace_all(text, " ");
        let text = text.trim();
        let text = self.stars.replace_all(text, "");
        let text = self.lone_zero.replace_all(&text, "O");
        let text = self.lone_one.replace_all(&text, "I");
        let text = self.lone_five.replace_all(&text, "S");
        let text = collapse_repeated_punct(&text);
        let text = self.non_ascii.replace_all(&text, "");
        let text = self.leading_non_word.replace(&text, "");
        self.comma_runs.replace_all(&text, ",").into_owned()
    }
}

/// `"Stop!!! Now..."` becomes `"Stop! Now."`; mixed runs like `?!` are kept
fn collapse_repeated_punct(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if prev == Some(c) && REPEATABLE_PUNCT.contains(&c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Split after `.`, `!` or `?` followed by spaces
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if SENTENCE_ENDINGS.contains(&c) && matches!(chars.peek(), Some((_, ' '))) {
            sentences.push(&text[start..i + c.len_utf8()]);
            while matches!(chars.peek(), Some((_, ' '))) {
                chars.next();
            }
            start = chars.peek().map_or(text.len(), |(j, _)| *j);
        }
    }
    sentences.push(&text[start..]);
    sentences
}

/// Drop a trailing sentence that lacks terminal punctuation
///
/// Text with fewer than two sentences is returned unchanged.
pub fn truncate_incomplete(text: &str) -> String {
    let sentences = split_sentences(text);
    if sentences.len() < 2 {
        return text.to_string();
    }
    let last = sentences[sentences.len() - 1].trim();
    match last.chars().last() {
        Some(c) if !SENTENCE_ENDINGS.contains(&c) => sentences[..sentences.len() - 1].join(" ").trim().to_string(),
        _ => text.trim().to_string(),
    }
}

/// Options for [`clean_file`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    /// Keep only the first [`TEST_ROWS`] rows
    pub test: bool,
    /// Apply [`truncate_incomplete`] after cleaning
    pub truncate_incomplete: bool,
}

/// One row before and after cleaning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedRow {
    pub key: String,
    pub original: String,
    pub cleaned: String,
}

/// What [`clean_file`] did
#[derive(Debug, Clone)]
pub struct CleanReport {
    pub output: PathBuf,
    pub rows_written: usize,
    pub skipped_empty: usize,
    pub skipped_malformed: usize,
    /// First rows, filled in test mode only
    pub preview: Vec<CleanedRow>,
}

/// `data/historical_regex_cleaned.csv` becomes `data/historical_regex_cleaned_TEST.csv`
pub fn test_output_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_TEST.{}", ext.to_string_lossy()),
        None => format!("{stem}_TEST"),
    };
    path.with_file_name(name)
}

/// Clean every `(Date, Text)` row of `input` into a new `output` file
///
/// Rows with empty text are dropped. The output is overwritten.
pub fn clean_file(input: &Path, output: &Path, options: CleanOptions) -> Result<CleanReport, CleanError> {
    debug!(input = %input.display(), output = %output.display(), ?options, "clean_file: called");
    let cleaner = Cleaner::new()?;
    let output = if options.test {
        test_output_path(output)
    } else {
        output.to_path_buf()
    };

    let write_err = |source: csv::Error| CleanError::Write {
        path: output.clone(),
        source,
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_err(e.into()))?;
    }
    let mut writer = csv::Writer::from_path(&output).map_err(write_err)?;
    writer.write_record([KEY_COLUMN, TEXT_COLUMN]).map_err(write_err)?;

    let limit = if options.test { TEST_ROWS } else { usize::MAX };
    let mut report = CleanReport {
        output: output.clone(),
        rows_written: 0,
        skipped_empty: 0,
        skipped_malformed: 0,
        preview: Vec::new(),
    };

    for item in CsvSource::open(input)?.records() {
        let record = match item {
            Ok(record) => record,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "clean_file: skipping malformed row");
                report.skipped_malformed += 1;
                continue;
            }
        };
        if record.text.is_empty() {
            report.skipped_empty += 1;
            continue;
        }
        if report.rows_written >= limit {
            break;
        }

        let mut cleaned = cleaner.clean(&record.text);
        if options.truncate_incomplete {
            cleaned = truncate_incomplete(&cleaned);
        }
        writer.write_record([record.key.as_str(), cleaned.as_str()]).map_err(write_err)?;
        report.rows_written += 1;

        if options.test && report.preview.len() < PREVIEW_ROWS {
            report.preview.push(CleanedRow {
                key: record.key,
                original: record.text,
                cleaned,
            });
        }
    }
    writer.flush().map_err(|e| write_err(e.into()))?;

    info!(
        output = %report.output.display(),
        rows = report.rows_written,
        empty = report.skipped_empty,
        malformed = report.skipped_malformed,
        "clean_file: done"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn clean(text: &str) -> String {
        Cleaner::new().unwrap().clean(text)
    }

    #[test]
    fn test_whitespace_and_stars() {
        assert_eq!(clean("  The  storm\n\tcame ** in  "), "The storm came  in");
    }

    #[test]
    fn test_lone_digits() {
        assert_eq!(clean("a 0 b 1 c 5 d 10 e 50"), "a O b I c S d 10 e 50");
    }

    #[test]
    fn test_repeated_punctuation() {
        assert_eq!(clean("Stop!!! Now... ok,, fine?!"), "Stop! Now. ok, fine?!");
        assert_eq!(clean("said ''quoted''"), "said 'quoted'");
    }

    #[test]
    fn test_non_ascii_and_leading_symbol() {
        assert_eq!(clean("\u{201c}Snow caf\u{e9}"), "Snow caf");
        assert_eq!(clean("-Rain"), "Rain");
        assert_eq!(clean("--Rain"), "-Rain");
    }

    #[test]
    fn test_commas_rejoined_after_non_ascii_removal() {
        assert_eq!(clean("wind,\u{e9},rain"), "wind,rain");
    }

    #[test]
    fn test_truncate_incomplete() {
        assert_eq!(truncate_incomplete("Cold day. Snow fell. And then"), "Cold day. Snow fell.");
        assert_eq!(truncate_incomplete("Cold day. Snow fell."), "Cold day. Snow fell.");
        assert_eq!(truncate_incomplete("no sentence end"), "no sentence end");
        assert_eq!(truncate_incomplete("Done! "), "Done!");
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(split_sentences("A.  B? c"), vec!["A.", "B?", "c"]);
        assert_eq!(split_sentences("1.5 inches"), vec!["1.5 inches"]);
    }

    #[test]
    fn test_test_output_path() {
        assert_eq!(
            test_output_path(Path::new("data/historical_regex_cleaned.csv")),
            PathBuf::from("data/historical_regex_cleaned_TEST.csv")
        );
        assert_eq!(test_output_path(Path::new("out")), PathBuf::from("out_TEST"));
    }

    #[test]
    fn test_clean_file() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("historical.csv");
        let output = temp.path().join("historical_regex_cleaned.csv");
        fs::write(
            &input,
            "Date,Text\n1880-01-01,\"Fair  and  cold...\"\n1880-01-02,\n1880-01-03,\"**Wind, rain\"\n",
        )
        .unwrap();

        let report = clean_file(&input, &output, CleanOptions::default()).unwrap();
        assert_eq!(report.rows_written, 2);
        assert_eq!(report.skipped_empty, 1);
        assert!(report.preview.is_empty());

        let records: Vec<_> = CsvSource::open(&output)
            .unwrap()
            .records()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(records[0].text, "Fair and cold.");
        assert_eq!(records[1].text, "Wind, rain");
    }

    #[test]
    fn test_clean_file_test_mode() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("raw.csv");
        let mut content = String::from("Date,Text\n");
        for i in 0..8 {
            content.push_str(&format!("d{i},text {i}\n"));
        }
        fs::write(&input, content).unwrap();

        let report = clean_file(
            &input,
            &temp.path().join("out.csv"),
            CleanOptions {
                test: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(report.output, temp.path().join("out_TEST.csv"));
        assert_eq!(report.rows_written, TEST_ROWS);
        assert_eq!(report.preview.len(), PREVIEW_ROWS);
        assert!(report.output.exists());
    }
}
