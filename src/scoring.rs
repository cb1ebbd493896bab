use crate::diff::correct_count;
use crate::reference::ReferenceText;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub wpm: u32,
    /// Whole percent, 0..=100.
    pub accuracy: u32,
}

impl ScoreResult {
    /// Score held before any input: nothing typed is fully accurate.
    pub const INITIAL: ScoreResult = ScoreResult {
        wpm: 0,
        accuracy: 100,
    };
}

impl Default for ScoreResult {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// How typed text is turned into "words" for WPM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WpmConvention {
    /// Whitespace-separated tokens.
    #[default]
    WhitespaceWords,
    /// Every five typed chars count as one word.
    FiveCharWords,
}

pub fn word_count(transcript: &[char]) -> usize {
    transcript
        .split(|c| c.is_whitespace())
        .filter(|w| !w.is_empty())
        .count()
}

fn wpm(words: f64, elapsed_minutes: f64) -> u32 {
    if elapsed_minutes <= 0.0 {
        return 0;
    }
    let rate = (words / elapsed_minutes).round();
    if rate.is_finite() && rate > 0.0 {
        rate.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

fn accuracy(reference: &ReferenceText, transcript: &[char]) -> u32 {
    if transcript.is_empty() {
        return 100;
    }
    let correct = correct_count(reference, transcript);
    (100.0 * correct as f64 / transcript.len() as f64).round() as u32
}

/// Score with the default whitespace-word convention.
pub fn score(reference: &ReferenceText, transcript: &[char], elapsed_minutes: f64) -> ScoreResult {
    score_with(
        WpmConvention::WhitespaceWords,
        reference,
        transcript,
        elapsed_minutes,
    )
}

pub fn score_with(
    convention: WpmConvention,
    reference: &ReferenceText,
    transcript: &[char],
    elapsed_minutes: f64,
) -> ScoreResult {
    let words = match convention {
        WpmConvention::WhitespaceWords => word_count(transcript) as f64,
        WpmConvention::FiveCharWords => transcript.len() as f64 / 5.0,
    };
    ScoreResult {
        wpm: wpm(words, elapsed_minutes),
        accuracy: accuracy(reference, transcript),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn reference(s: &str) -> ReferenceText {
        ReferenceText::new(s).unwrap()
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(&chars("")), 0);
        assert_eq!(word_count(&chars("   ")), 0);
        assert_eq!(word_count(&chars("cat")), 1);
        assert_eq!(word_count(&chars("cat dog")), 2);
        assert_eq!(word_count(&chars("  cat \t\n dog  ")), 2);
        assert_eq!(word_count(&chars("cat do")), 2);
    }

    #[test]
    fn two_words_in_one_minute() {
        let r = reference("cat dog");
        assert_eq!(
            score(&r, &chars("cat dog"), 1.0),
            ScoreResult {
                wpm: 2,
                accuracy: 100
            }
        );
    }

    #[test]
    fn wpm_rounds_to_nearest() {
        let r = reference("a b c");
        // 3 words in 2 minutes is 1.5 -> 2
        assert_eq!(score(&r, &chars("a b c"), 2.0).wpm, 2);
        // 1 word in 3 minutes is 0.33 -> 0
        assert_eq!(score(&r, &chars("a"), 3.0).wpm, 0);
        // 2 words in 30 seconds
        assert_eq!(score(&r, &chars("a b"), 0.5).wpm, 4);
    }

    #[test]
    fn zero_elapsed_gives_zero_wpm() {
        let r = reference("cat dog");
        assert_eq!(score(&r, &chars("cat dog"), 0.0).wpm, 0);
        assert_eq!(score(&r, &chars(""), 0.0).wpm, 0);
        assert_eq!(score(&r, &chars("cat"), -1.0).wpm, 0);
    }

    #[test]
    fn non_finite_elapsed_gives_zero_wpm() {
        let r = reference("cat dog");
        assert_eq!(score(&r, &chars("cat"), f64::NAN).wpm, 0);
        assert_eq!(score(&r, &chars("cat"), f64::INFINITY).wpm, 0);
    }

    #[test]
    fn empty_transcript_is_fully_accurate() {
        let r = reference("hello");
        assert_eq!(score(&r, &[], 0.5), ScoreResult::INITIAL);
    }

    #[test]
    fn accuracy_counts_positional_matches() {
        let r = reference("hello");
        assert_eq!(score(&r, &chars("hxllo"), 1.0).accuracy, 80);
        assert_eq!(score(&r, &chars("hx"), 1.0).accuracy, 50);
        assert_eq!(score(&r, &chars("xxx"), 1.0).accuracy, 0);
        // 2 of 3 -> 66.67 -> 67
        assert_eq!(score(&r, &chars("hex"), 1.0).accuracy, 67);
    }

    #[test]
    fn exact_match_is_fully_accurate() {
        let r = reference("The quick brown fox");
        assert_eq!(score(&r, &chars("The quick brown fox"), 0.25).accuracy, 100);
    }

    #[test]
    fn five_char_convention() {
        let r = reference("abcdefghij");
        let s = score_with(WpmConvention::FiveCharWords, &r, &chars("abcdefghij"), 1.0);
        assert_eq!(s.wpm, 2);
        assert_eq!(s.accuracy, 100);
        let s = score_with(WpmConvention::FiveCharWords, &r, &chars("abcdefghij"), 0.0);
        assert_eq!(s.wpm, 0);
    }

    #[test]
    fn scoring_is_idempotent() {
        let r = reference("cat dog");
        let t = chars("cat dxg");
        assert_eq!(score(&r, &t, 0.75), score(&r, &t, 0.75));
    }

    #[test]
    fn convention_serializes_snake_case() {
        let s = serde_json::to_string(&WpmConvention::FiveCharWords).unwrap();
        assert_eq!(s, "\"five_char_words\"");
        assert_eq!(WpmConvention::default(), WpmConvention::WhitespaceWords);
    }
}
