/*!
 * Document segmentation.
 *
 * A document is split on whitespace and its words are grouped into
 * consecutive, non-overlapping segments of at most `max_words` words.
 * Segmentation is lazy and pure: the iterator borrows the document and can
 * be cloned or rebuilt to walk the same segments again.
 */

use std::fmt;
use std::str::SplitWhitespace;

/// Default maximum number of words per segment
pub const DEFAULT_MAX_WORDS: usize = 600;

/// A bounded run of consecutive words taken from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Zero-based position of this segment in the document
    pub index: usize,

    /// Words of the segment, in document order
    words: Vec<&'a str>,
}

impl<'a> Segment<'a> {
    /// Words of the segment, in document order
    pub fn words(&self) -> &[&'a str] {
        &self.words
    }

    /// Number of words in the segment
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Segment text with words joined by single spaces
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(word)?;
        }
        Ok(())
    }
}

/// Lazy iterator over the segments of a document
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    words: SplitWhitespace<'a>,
    max_words: usize,
    next_index: usize,
}

impl<'a> Segments<'a> {
    /// Create a segment iterator over `text`.
    ///
    /// A `max_words` of zero is treated as one so iteration always advances.
    pub fn new(text: &'a str, max_words: usize) -> Self {
        Self {
            words: text.split_whitespace(),
            max_words: max_words.max(1),
            next_index: 0,
        }
    }

    /// Maximum number of words per segment
    pub fn max_words(&self) -> usize {
        self.max_words
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let words: Vec<&'a str> = self.words.by_ref().take(self.max_words).collect();
        if words.is_empty() {
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;
        Some(Segment { index, words })
    }
}

impl std::iter::FusedIterator for Segments<'_> {}

/// Split `text` into segments of at most `max_words` words
pub fn segments(text: &str, max_words: usize) -> Segments<'_> {
    Segments::new(text, max_words)
}

/// Number of whitespace-delimited words in `text`
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of segments a document of `word_count` words produces
pub fn count_segments(word_count: usize, max_words: usize) -> usize {
    word_count.div_ceil(max_words.max(1))
}
