use itertools::Itertools;
use rand::{seq::index, Rng};

pub const DEFAULT_SAMPLE_SIZE: usize = 15;

/// Draws a practice line from a word list: distinct words, random order.
#[derive(Debug, Clone, PartialEq)]
pub struct WordPicker {
    words: Vec<String>,
    sample_size: usize,
}

impl WordPicker {
    /// `None` for an empty list.
    pub fn new(words: Vec<String>, sample_size: usize) -> Option<Self> {
        if words.is_empty() {
            return None;
        }
        Some(Self { words, sample_size })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Number of words a pick yields, clamped to the list length.
    pub fn pick_len(&self) -> usize {
        self.sample_size.min(self.words.len())
    }

    pub fn pick(&self) -> String {
        self.pick_with(&mut rand::thread_rng())
    }

    pub fn pick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        index::sample(rng, self.words.len(), self.pick_len())
            .into_iter()
            .map(|i| self.words[i].as_str())
            .join(" ")
    }
}
