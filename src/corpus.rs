//! # Canonical Corpus Model
//!
//! ## Purpose
//! The canonical `book → chapter → verse` structure that every parser
//! produces and every rewriting pass consumes. The pipeline is a *text
//! mutator*, not a *structure pruner*: chapter and verse entries that have
//! never held content are deliberate structural entries and must survive
//! every transformation unchanged.
//!
//! ## Input/Output Specification
//! - **Input**: three-level UTF-8 JSON objects (`{book: {chapter: {verse: text}}}`)
//! - **Output**: the same shape, with chapter/verse keys emitted in ascending
//!   numeric order and books in their original insertion order
//! - **Key grammar**: chapter and verse keys are decimal strings with no
//!   leading zeros (except `"0"` itself); violations are a deserialization error
//!
//! ## Key Features
//! - Books kept in insertion order; chapters/verses ordered numerically
//! - Empty chapter and verse maps round-trip intact
//! - Bulk text mapping helper shared by the modernization engine and the
//!   structure-preserving processor

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Verses of one chapter, keyed by verse number
pub type VerseMap = BTreeMap<u32, String>;

/// Chapters of one book, keyed by chapter number
pub type ChapterMap = BTreeMap<u32, VerseMap>;

/// The full book → chapter → verse text structure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    books: Vec<(String, ChapterMap)>,
}

impl Corpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of books
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// Total number of verse entries across all books
    pub fn verse_count(&self) -> usize {
        self.books
            .iter()
            .map(|(_, chapters)| chapters.values().map(|v| v.len()).sum::<usize>())
            .sum()
    }

    /// Total number of chapter entries (including empty ones)
    pub fn chapter_count(&self) -> usize {
        self.books.iter().map(|(_, chapters)| chapters.len()).sum()
    }

    /// Iterate books in insertion order
    pub fn books(&self) -> impl Iterator<Item = (&str, &ChapterMap)> {
        self.books.iter().map(|(name, ch)| (name.as_str(), ch))
    }

    /// Look up a book's chapters by name
    pub fn book(&self, name: &str) -> Option<&ChapterMap> {
        self.books
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ch)| ch)
    }

    /// Get or create a book entry, preserving insertion order
    pub fn book_mut(&mut self, name: &str) -> &mut ChapterMap {
        if let Some(idx) = self.books.iter().position(|(n, _)| n == name) {
            return &mut self.books[idx].1;
        }
        self.books.push((name.to_string(), ChapterMap::new()));
        &mut self.books.last_mut().expect("book just pushed").1
    }

    /// Insert or create an empty chapter entry (a structural placeholder)
    pub fn ensure_chapter(&mut self, book: &str, chapter: u32) {
        self.book_mut(book).entry(chapter).or_default();
    }

    /// Insert a verse, creating book and chapter entries as needed
    pub fn insert_verse(&mut self, book: &str, chapter: u32, verse: u32, text: impl Into<String>) {
        self.book_mut(book)
            .entry(chapter)
            .or_default()
            .insert(verse, text.into());
    }

    /// Look up a single verse text
    pub fn verse(&self, book: &str, chapter: u32, verse: u32) -> Option<&str> {
        self.book(book)?
            .get(&chapter)?
            .get(&verse)
            .map(String::as_str)
    }

    /// Iterate every verse as `(book, chapter, verse, text)`
    pub fn verses(&self) -> impl Iterator<Item = (&str, u32, u32, &str)> {
        self.books.iter().flat_map(|(book, chapters)| {
            chapters.iter().flat_map(move |(&chapter, verses)| {
                verses
                    .iter()
                    .map(move |(&verse, text)| (book.as_str(), chapter, verse, text.as_str()))
            })
        })
    }

    /// Rewrite every verse text through `f`, preserving all book, chapter, and
    /// verse keys (including empty ones). Returns the new corpus and the
    /// number of verses whose text changed.
    pub fn map_verse_texts<F>(&self, mut f: F) -> (Corpus, usize)
    where
        F: FnMut(&str, u32, u32, &str) -> String,
    {
        let mut out = Corpus::new();
        let mut modified = 0;
        for (book, chapters) in &self.books {
            let out_chapters = out.book_mut(book);
            for (&chapter, verses) in chapters {
                let out_verses = out_chapters.entry(chapter).or_default();
                for (&verse, text) in verses {
                    let rewritten = f(book, chapter, verse, text);
                    if rewritten != *text {
                        modified += 1;
                    }
                    out_verses.insert(verse, rewritten);
                }
            }
        }
        (out, modified)
    }
}

impl Serialize for Corpus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Chapters<'a>(&'a ChapterMap);
        struct Verses<'a>(&'a VerseMap);

        impl Serialize for Chapters<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                // BTreeMap iteration gives the ascending numeric key order
                // the output format requires.
                for (chapter, verses) in self.0 {
                    map.serialize_entry(&chapter.to_string(), &Verses(verses))?;
                }
                map.end()
            }
        }

        impl Serialize for Verses<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (verse, text) in self.0 {
                    map.serialize_entry(&verse.to_string(), text)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.books.len()))?;
        for (book, chapters) in &self.books {
            map.serialize_entry(book, &Chapters(chapters))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Corpus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CorpusVisitor;

        impl<'de> Visitor<'de> for CorpusVisitor {
            type Value = Corpus;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a book → chapter → verse mapping")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Corpus, A::Error> {
                let mut corpus = Corpus::new();
                while let Some((book, raw_chapters)) =
                    access.next_entry::<String, BTreeMap<String, BTreeMap<String, String>>>()?
                {
                    let chapters = corpus.book_mut(&book);
                    for (chapter_key, raw_verses) in raw_chapters {
                        let chapter = parse_numeric_key::<A::Error>(&book, &chapter_key)?;
                        let verses = chapters.entry(chapter).or_default();
                        for (verse_key, text) in raw_verses {
                            let verse = parse_numeric_key::<A::Error>(&book, &verse_key)?;
                            verses.insert(verse, text);
                        }
                    }
                }
                Ok(corpus)
            }
        }

        deserializer.deserialize_map(CorpusVisitor)
    }
}

/// Parse a chapter/verse key. Decimal digits only, no leading zeros except
/// the literal `"0"`.
fn parse_numeric_key<E: de::Error>(book: &str, key: &str) -> std::result::Result<u32, E> {
    let valid_shape = key == "0"
        || (!key.is_empty()
            && !key.starts_with('0')
            && key.bytes().all(|b| b.is_ascii_digit()));
    if !valid_shape {
        return Err(E::custom(format!(
            "invalid chapter/verse key '{}' in book '{}'",
            key, book
        )));
    }
    key.parse::<u32>()
        .map_err(|_| E::custom(format!("chapter/verse key '{}' out of range", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Corpus {
        let mut corpus = Corpus::new();
        corpus.insert_verse("Genesis", 1, 1, "In the beginning");
        corpus.insert_verse("Genesis", 1, 2, "And the earth");
        corpus.insert_verse("Exodus", 1, 1, "Now these are the names");
        corpus
    }

    #[test]
    fn test_book_insertion_order_preserved() {
        let mut corpus = Corpus::new();
        corpus.insert_verse("Zephaniah", 1, 1, "a");
        corpus.insert_verse("Amos", 1, 1, "b");
        let names: Vec<&str> = corpus.books().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Zephaniah", "Amos"]);
    }

    #[test]
    fn test_chapters_serialize_in_numeric_order() {
        let mut corpus = Corpus::new();
        corpus.insert_verse("Psalms", 10, 1, "ten");
        corpus.insert_verse("Psalms", 2, 1, "two");
        corpus.insert_verse("Psalms", 1, 1, "one");
        let json = serde_json::to_string(&corpus).unwrap();
        let one = json.find("\"1\"").unwrap();
        let two = json.find("\"2\"").unwrap();
        let ten = json.find("\"10\"").unwrap();
        assert!(one < two && two < ten);
    }

    #[test]
    fn test_empty_chapter_round_trips() {
        let mut corpus = sample();
        corpus.ensure_chapter("Genesis", 51);
        let json = serde_json::to_string(&corpus).unwrap();
        let back: Corpus = serde_json::from_str(&json).unwrap();
        assert_eq!(back.book("Genesis").unwrap().get(&51), Some(&VerseMap::new()));
        assert_eq!(back, corpus);
    }

    #[test]
    fn test_leading_zero_key_rejected() {
        let result: std::result::Result<Corpus, _> =
            serde_json::from_str(r#"{"Genesis": {"01": {"1": "text"}}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_numeric_key_rejected() {
        let result: std::result::Result<Corpus, _> =
            serde_json::from_str(r#"{"Genesis": {"one": {"1": "text"}}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_map_verse_texts_counts_changes() {
        let corpus = sample();
        let (mapped, modified) = corpus.map_verse_texts(|_, _, _, text| {
            text.replace("beginning", "start")
        });
        assert_eq!(modified, 1);
        assert_eq!(mapped.verse("Genesis", 1, 1), Some("In the start"));
        assert_eq!(mapped.verse("Exodus", 1, 1), Some("Now these are the names"));
    }

    #[test]
    fn test_verse_count() {
        assert_eq!(sample().verse_count(), 3);
    }
}
