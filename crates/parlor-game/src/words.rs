//! Candidate secret words.

use std::sync::Arc;

/// Words used when no list is configured.
const DEFAULT_WORDS: &[&str] = &[
    "airport", "bakery", "beach", "birthday", "bicycle", "camera",
    "castle", "circus", "coffee", "concert", "desert", "dentist",
    "dragon", "elevator", "farm", "fireworks", "garden", "guitar",
    "hospital", "iceberg", "island", "jungle", "kitchen", "library",
    "lighthouse", "museum", "volcano", "pirate", "pizza", "planet",
    "restaurant", "robot", "rocket", "school", "submarine", "subway",
    "supermarket", "telescope", "tornado", "umbrella", "vampire",
    "wedding", "zoo",
];

/// Errors building a [`WordList`].
#[derive(Debug, thiserror::Error)]
pub enum WordListError {
    /// The list had no usable words.
    #[error("word list is empty")]
    Empty,
}

/// A non-empty, ordered list of candidate secret words.
///
/// Cheap to clone: rooms share one list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList(Arc<[String]>);

impl WordList {
    /// Builds a list from the given words. Blank entries are dropped so
    /// a drawn word is never empty.
    ///
    /// # Errors
    /// Returns [`WordListError::Empty`] if no non-blank word remains.
    pub fn new<I, S>(words: I) -> Result<Self, WordListError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(Into::into)
            .filter(|w: &String| !w.trim().is_empty())
            .collect();
        if words.is_empty() {
            return Err(WordListError::Empty);
        }
        Ok(Self(words.into()))
    }

    /// Parses one word per line. Blank lines and lines starting with `#`
    /// are skipped, surrounding whitespace is trimmed.
    pub fn from_lines(text: &str) -> Result<Self, WordListError> {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a constructed list.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.iter().any(|w| w == word)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for WordList {
    fn default() -> Self {
        Self(DEFAULT_WORDS.iter().map(|w| w.to_string()).collect())
    }
}
