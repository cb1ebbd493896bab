use crate::error::{HakiError, Result};
use std::fmt;
use std::fs;
use std::path::Path;

/// Passage used when no prompt or file is given.
pub const SAMPLE_TEXT: &str = "The quick brown fox jumps over the lazy dog. Programming is the art of telling a computer what to do through a series of instructions. Every great developer was once a beginner who never gave up on their dreams. In the world of technology, speed and accuracy are essential skills that can set you apart from the competition.";

/// The fixed target a participant has to reproduce. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceText {
    text: String,
    chars: Vec<char>,
}

impl ReferenceText {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(HakiError::EmptyReference);
        }
        let chars = text.chars().collect();
        Ok(Self { text, chars })
    }

    /// Built-in sample passage.
    pub fn sample() -> Self {
        Self {
            text: SAMPLE_TEXT.to_string(),
            chars: SAMPLE_TEXT.chars().collect(),
        }
    }

    /// Read a passage from disk. Line breaks are folded into single spaces so
    /// the passage types as one line.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| HakiError::ReadReference {
            path: path.to_path_buf(),
            source,
        })?;
        let joined = raw
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the passage has no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }
}

impl fmt::Display for ReferenceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
