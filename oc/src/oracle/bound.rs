//! Length ceiling for oracle output
//!
//! An answer longer than its input is cut to the input's character length.
//! If a sentence end falls inside the trailing `snap_window` fraction of
//! that cut, the cut moves back to just after it so the answer does not
//! end on a dangling clause.

use tracing::debug;

/// Marks that end a sentence
pub const SENTENCE_ENDINGS: &[char] = &['.', '!', '?'];

#[derive(Debug, Clone, Copy)]
pub struct LengthBound {
    snap_window: f64,
}

impl Default for LengthBound {
    fn default() -> Self {
        Self { snap_window: 0.2 }
    }
}

impl LengthBound {
    /// `snap_window` is clamped to `0.0..=1.0`
    pub fn new(snap_window: f64) -> Self {
        Self {
            snap_window: snap_window.clamp(0.0, 1.0),
        }
    }

    /// Trim `output` and bound it by the character length of `input`
    pub fn apply(&self, input: &str, output: &str) -> String {
        let output = output.trim();
        let limit = input.chars().count();
        let output_len = output.chars().count();

        if output_len <= limit {
            return output.to_string();
        }

        let cut = output.char_indices().nth(limit).map(|(i, _)| i).unwrap_or(output.len());
        let mut window = &output[..cut];

        let threshold = limit as f64 * (1.0 - self.snap_window);
        if let Some((byte_idx, mark)) = window.char_indices().rev().find(|(_, c)| SENTENCE_ENDINGS.contains(c)) {
            let char_pos = window[..byte_idx].chars().count();
            if char_pos as f64 > threshold {
                window = &window[..byte_idx + mark.len_utf8()];
            }
        }

        debug!(limit, output_len, kept = window.chars().count(), "LengthBound::apply: truncated");
        window.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_output_untouched() {
        let bound = LengthBound::default();
        assert_eq!(bound.apply("Tbe storm", "  The storm "), "The storm");
    }

    #[test]
    fn test_truncates_to_input_length() {
        let bound = LengthBound::default();
        // No sentence end in the window: plain cut
        assert_eq!(bound.apply("abcde", "abcdefghij"), "abcde");
    }

    #[test]
    fn test_snaps_to_sentence_end_in_trailing_window() {
        let bound = LengthBound::default();
        let input = "x".repeat(20);
        // Period at index 17, inside the last 20% of 20 chars
        let output = "It rained all day. Then the wind came";
        assert_eq!(bound.apply(&input, output), "It rained all day.");
    }

    #[test]
    fn test_ignores_sentence_end_outside_window() {
        let bound = LengthBound::default();
        let input = "x".repeat(20);
        // Period at char 3 is far before the threshold; keep the plain cut
        let output = "Hot. The afternoon brought hail and thunder";
        assert_eq!(bound.apply(&input, output), "Hot. The afternoon b");
    }

    #[test]
    fn test_question_and_exclamation_count() {
        let bound = LengthBound::default();
        let input = "y".repeat(12);
        assert_eq!(bound.apply(&input, "Wet? Windy! Cold and grey"), "Wet? Windy!");
    }

    #[test]
    fn test_multibyte_characters() {
        let bound = LengthBound::default();
        assert_eq!(bound.apply("ééé", "àèìòù"), "àèì");
    }

    #[test]
    fn test_zero_window_never_snaps() {
        let bound = LengthBound::new(0.0);
        let input = "x".repeat(10);
        assert_eq!(bound.apply(&input, "Dry day. Then rain came"), "Dry day. T");
    }

    proptest! {
        #[test]
        fn prop_length_ceiling(input in "\\PC{0,80}", output in "\\PC{0,200}", window in 0.0f64..1.0) {
            let bounded = LengthBound::new(window).apply(&input, &output);
            prop_assert!(bounded.chars().count() <= input.chars().count());
        }
    }
}
