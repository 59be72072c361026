//! # Verse Address Codec
//!
//! ## Purpose
//! Converts between the structured `(book, chapter, verse)` triple and its
//! canonical single-line text form `"<Book> <chapter>:<verse> <text>"`, and
//! back. The address is the join key between rule-engine output and the
//! override table, so its grammar is the single source of truth for what a
//! verse line looks like.
//!
//! ## Input/Output Specification
//! - **Input**: verse components or serialized verse lines
//! - **Output**: canonical lines, decoded [`VerseLine`] values, or bare
//!   address strings for override lookup
//! - **Grammar**: book `^[1-3]?\s?[A-Za-z ]+$` (whitespace-normalized),
//!   chapter/verse positive decimal integers without leading zeros
//!
//! Lines that fail the full-line grammar are dropped by the rebuild step and
//! surfaced as diagnostics; `parse_address_only` is the deliberately looser
//! prefix match used only to look up overrides.

use once_cell::sync::Lazy;
use regex::Regex;

/// Full-line grammar: address prefix, separator, verse text
static LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([1-3]?\s?[A-Za-z ]+)\s+(\d+):(\d+)\s+(.*)$").expect("line grammar"));

/// Looser prefix grammar used for override lookup only
static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([1-3]?\s?[A-Za-z ]+)\s+(\d+):(\d+)\b").expect("address grammar"));

/// Prefix splitter for `set` overrides: captures the address prefix
/// (including its trailing separator) and the remainder of the line
static PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([1-3]?\s?[A-Za-z ]+\s+\d+:\d+\s+)(.*)$").expect("prefix grammar")
});

static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace run"));

/// A verse line decoded into its components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseLine {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl VerseLine {
    /// The canonical `"Book C:V"` identifier for this verse
    pub fn address(&self) -> String {
        format!("{} {}:{}", self.book, self.chapter, self.verse)
    }

    /// Serialize back to the canonical line form
    pub fn encode(&self) -> String {
        encode_line(&self.book, self.chapter, self.verse, &self.text)
    }
}

/// Collapse runs of whitespace to single spaces and trim
pub fn normalize_book_name(book: &str) -> String {
    WHITESPACE_RUN_RE
        .replace_all(book.trim(), " ")
        .into_owned()
}

/// Produce `"{book} {chapter}:{verse} {text}"`. No escaping is performed;
/// text that itself resembles a verse address is a known ambiguity the
/// decode-miss diagnostics exist to catch.
pub fn encode_line(book: &str, chapter: u32, verse: u32, text: &str) -> String {
    format!("{} {}:{} {}", normalize_book_name(book), chapter, verse, text)
}

/// Decode a canonical line into its components. Returns `None` for lines
/// that do not match the full-line grammar.
pub fn decode_line(line: &str) -> Option<VerseLine> {
    let caps = LINE_RE.captures(line)?;
    Some(VerseLine {
        book: normalize_book_name(caps.get(1)?.as_str()),
        chapter: caps.get(2)?.as_str().parse().ok()?,
        verse: caps.get(3)?.as_str().parse().ok()?,
        text: caps.get(4)?.as_str().to_string(),
    })
}

/// Extract just the `"Book C:V"` address from a line's prefix, independent of
/// whether the full-line decode would succeed. `None` means "no override
/// applies".
pub fn parse_address_only(line: &str) -> Option<String> {
    let caps = ADDRESS_RE.captures(line)?;
    Some(format!(
        "{} {}:{}",
        normalize_book_name(caps.get(1)?.as_str()),
        caps.get(2)?.as_str(),
        caps.get(3)?.as_str()
    ))
}

/// Split a line into `(address prefix, verse text)`, keeping the prefix's
/// trailing separator. Used by `set` overrides, which must discard the text
/// while re-synthesizing the line with the original prefix.
pub fn split_address_prefix(line: &str) -> Option<(&str, &str)> {
    let caps = PREFIX_RE.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}
