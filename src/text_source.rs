use std::fs;
use std::path::{Path, PathBuf};

use cgisf_lib::cgisf;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::Rng;
use serde_json::Value;

use crate::error::SourceError;
use crate::word_picker::WordPicker;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

/// Supplies the next target text for the engine.
pub trait TextSource {
    fn next_text(&mut self) -> Result<String, SourceError>;

    /// Short label for status lines
    fn describe(&self) -> String;
}

/// Only spaces can be typed as separators, so line breaks, tabs and runs of
/// blanks collapse to single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}

/// The same text every time
#[derive(Debug, Clone)]
pub struct StaticText {
    text: String,
}

impl StaticText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: normalize_whitespace(&text.into()),
        }
    }
}

impl TextSource for StaticText {
    fn next_text(&mut self) -> Result<String, SourceError> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        "custom prompt".to_string()
    }
}

/// Whole contents of a text file, re-read on every load
#[derive(Debug, Clone)]
pub struct FileText {
    path: PathBuf,
}

impl FileText {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TextSource for FileText {
    fn next_text(&mut self) -> Result<String, SourceError> {
        let text = fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(normalize_whitespace(&text))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Random picks from a word list
#[derive(Debug, Clone)]
pub struct WordListText {
    name: String,
    picker: WordPicker,
}

impl WordListText {
    pub fn new(name: impl Into<String>, picker: WordPicker) -> Self {
        Self {
            name: name.into(),
            picker,
        }
    }

    pub fn from_json(
        name: impl Into<String>,
        json: &str,
        sample_size: usize,
    ) -> Result<Self, SourceError> {
        let words = parse_word_list(json)?;
        let picker = WordPicker::new(words, sample_size).ok_or(SourceError::EmptyWordList)?;
        Ok(Self::new(name, picker))
    }

    pub fn from_file<P: AsRef<Path>>(path: P, sample_size: usize) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path.display().to_string(), &json, sample_size)
    }

    /// A word list compiled into the binary, looked up by file stem
    pub fn bundled(name: &str, sample_size: usize) -> Result<Self, SourceError> {
        let json = LANG_DIR
            .get_file(format!("{name}.json"))
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| SourceError::UnknownWordList {
                name: name.to_string(),
            })?;
        Self::from_json(name, json, sample_size)
    }

    pub fn picker(&self) -> &WordPicker {
        &self.picker
    }
}

impl TextSource for WordListText {
    fn next_text(&mut self) -> Result<String, SourceError> {
        Ok(self.picker.pick())
    }

    fn describe(&self) -> String {
        format!("{} ({} words)", self.name, self.picker.pick_len())
    }
}

/// Names of the word lists compiled into the binary
pub fn bundled_word_lists() -> Vec<String> {
    let mut names: Vec<String> = LANG_DIR
        .files()
        .filter_map(|f| f.path().file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Accepts `{"words": [...]}`, a bare array of strings, or an object whose
/// string values are the words. Non-string entries are skipped.
pub fn parse_word_list(json: &str) -> Result<Vec<String>, SourceError> {
    let value: Value = serde_json::from_str(json)?;
    let strings = |items: &Vec<Value>| -> Vec<String> {
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    };

    let words = match &value {
        Value::Array(items) => strings(items),
        Value::Object(map) => match map.get("words") {
            Some(Value::Array(items)) => strings(items),
            _ => map
                .values()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        },
        _ => Vec::new(),
    };

    if words.is_empty() {
        return Err(SourceError::EmptyWordList);
    }
    Ok(words)
}

/// Generated pseudo-English sentences
#[derive(Debug, Clone)]
pub struct SentenceText {
    count: usize,
}

impl SentenceText {
    pub fn new(count: usize) -> Self {
        Self {
            count: count.max(1),
        }
    }
}

impl TextSource for SentenceText {
    fn next_text(&mut self) -> Result<String, SourceError> {
        let rng = &mut rand::thread_rng();
        let sentences: Vec<String> = (0..self.count)
            .map(|_| {
                cgisf(
                    rng.gen_range(1..3),
                    rng.gen_range(1..3),
                    rng.gen_range(1..5),
                    rng.gen_bool(0.5),
                    rng.gen_range(1..3),
                    rng.gen_bool(0.5),
                )
            })
            .collect();
        Ok(sentences.concat().trim_end().to_string())
    }

    fn describe(&self) -> String {
        format!("{} sentences", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn static_text_repeats() {
        let mut source = StaticText::new("hello world");
        assert_eq!(source.next_text().unwrap(), "hello world");
        assert_eq!(source.next_text().unwrap(), "hello world");
    }

    #[test]
    fn static_text_may_be_empty() {
        let mut source = StaticText::new("");
        assert_eq!(source.next_text().unwrap(), "");
    }

    #[test]
    fn file_text_trims_trailing_newline() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "typing from a file").unwrap();
        let mut source = FileText::new(file.path());
        assert_eq!(source.next_text().unwrap(), "typing from a file");
    }

    #[test]
    fn file_text_joins_lines_with_spaces() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "ab\ncd\r\n\tef  gh\n").unwrap();
        let mut source = FileText::new(file.path());
        assert_eq!(source.next_text().unwrap(), "ab cd ef gh");
    }

    #[test]
    fn static_text_collapses_whitespace() {
        let mut source = StaticText::new("  one\ttwo\n three ");
        assert_eq!(source.next_text().unwrap(), "one two three");
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut source = FileText::new("/definitely/not/here.txt");
        assert_matches!(source.next_text(), Err(SourceError::Io { .. }));
    }

    #[test]
    fn parse_words_object() {
        let words = parse_word_list(r#"{"name":"t","words":["a","b","c"]}"#).unwrap();
        assert_eq!(words, vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_bare_array() {
        let words = parse_word_list(r#"["x", 3, "y"]"#).unwrap();
        assert_eq!(words, vec!["x", "y"]);
    }

    #[test]
    fn parse_object_values() {
        let mut words = parse_word_list(r#"{"first":"alpha","second":"beta","n":1}"#).unwrap();
        words.sort();
        assert_eq!(words, vec!["alpha", "beta"]);
    }

    #[test]
    fn parse_rejects_empty_and_invalid() {
        assert_matches!(
            parse_word_list(r#"{"words":[]}"#),
            Err(SourceError::EmptyWordList)
        );
        assert_matches!(parse_word_list("42"), Err(SourceError::EmptyWordList));
        assert_matches!(parse_word_list("{nope"), Err(SourceError::Json(_)));
    }

    #[test]
    fn word_list_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"words":["red","green","blue"]}}"#).unwrap();
        let mut source = WordListText::from_file(file.path(), 15).unwrap();
        let text = source.next_text().unwrap();
        assert_eq!(text.split(' ').count(), 3);
    }

    #[test]
    fn bundled_english_is_available() {
        assert!(bundled_word_lists().contains(&"english".to_string()));
        let mut source = WordListText::bundled("english", 10).unwrap();
        let text = source.next_text().unwrap();
        assert_eq!(text.split(' ').count(), 10);
        for word in text.split(' ') {
            assert!(source.picker().words().iter().any(|w| w == word));
        }
    }

    #[test]
    fn unknown_bundled_list() {
        assert_matches!(
            WordListText::bundled("klingon", 10),
            Err(SourceError::UnknownWordList { .. })
        );
    }

    #[test]
    fn sentences_are_generated() {
        let mut source = SentenceText::new(2);
        let text = source.next_text().unwrap();
        assert!(!text.is_empty());
        assert!(text.chars().any(|c| c.is_alphabetic()));
        assert!(!text.ends_with(' '));
    }
}
