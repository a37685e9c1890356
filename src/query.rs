//! Query validation and cleanup.
//!
//! Raw input is checked for length first, then reduced to an allow-listed
//! character set, whitespace-collapsed and split into terms. The cleaned
//! text keeps its original casing so it can be echoed back to the caller;
//! matching always uses the lowercase form.

use crate::error::{Error, Result};

/// Longest accepted raw query, in characters.
pub const MAX_QUERY_CHARS: usize = 100;

/// Punctuation that shows up in real titles and survives cleanup.
const TITLE_PUNCTUATION: &[char] = &['-', '\'', '.', ':', ',', '&', '!', '?'];

/// A validated, cleaned query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    display: String,
    normalized: String,
    terms: Vec<String>,
}

impl NormalizedQuery {
    /// Cleaned query with the caller's casing.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Cleaned, lowercased query used for exact comparisons.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Distinct lowercase terms in first-seen order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// True when nothing searchable is left after cleanup. This selects
    /// the alphabetical listing path, it is not a failed match.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Validate and clean a raw query string.
///
/// The length check runs on the raw input, so an over-long query is
/// rejected even when most of it would have been stripped.
pub fn normalize(raw: &str) -> Result<NormalizedQuery> {
    let len = raw.chars().count();
    if len > MAX_QUERY_CHARS {
        return Err(Error::QueryTooLong {
            len,
            max: MAX_QUERY_CHARS,
        });
    }

    let display = clean(raw);
    let normalized = display.to_lowercase();

    let mut terms: Vec<String> = Vec::new();
    for word in normalized.split_whitespace() {
        // Edge punctuation never helps a substring match, and a lone "-"
        // or "." would match half the catalog.
        let term = word.trim_matches(|c: char| !c.is_alphanumeric());
        if term.is_empty() {
            continue;
        }
        if !terms.iter().any(|t| t == term) {
            terms.push(term.to_string());
        }
    }

    Ok(NormalizedQuery {
        display,
        normalized,
        terms,
    })
}

/// Strip disallowed characters and collapse whitespace, keeping case.
///
/// Field values go through the same function before exact comparisons so
/// that "Harry Potter & the Goblet" and "harry  potter & the goblet"
/// compare equal.
pub fn clean(text: &str) -> String {
    let kept: String = text.chars().filter(|&c| is_allowed(c)).collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_allowed(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || TITLE_PUNCTUATION.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_terms_are_lowercased() {
        let q = normalize("Science Fiction Asimov").unwrap();
        assert_eq!(q.terms(), ["science", "fiction", "asimov"]);
        assert_eq!(q.normalized(), "science fiction asimov");
    }

    #[test]
    fn display_keeps_original_casing() {
        let q = normalize("  The   Great GATSBY ").unwrap();
        assert_eq!(q.display(), "The Great GATSBY");
        assert_eq!(q.normalized(), "the great gatsby");
    }

    #[test]
    fn disallowed_characters_are_stripped() {
        let q = normalize("harry* <potter> #1").unwrap();
        assert_eq!(q.display(), "harry potter 1");
        assert_eq!(q.terms(), ["harry", "potter", "1"]);
    }

    #[test]
    fn title_punctuation_survives() {
        let q = normalize("O'Brien: Catch-22, vol. 1!").unwrap();
        assert_eq!(q.display(), "O'Brien: Catch-22, vol. 1!");
        assert_eq!(q.terms(), ["o'brien", "catch-22", "vol", "1"]);
    }

    #[test]
    fn duplicate_terms_collapse() {
        let q = normalize("dune Dune DUNE messiah").unwrap();
        assert_eq!(q.terms(), ["dune", "messiah"]);
    }

    #[test]
    fn whitespace_only_is_empty() {
        let q = normalize(" \t \n ").unwrap();
        assert!(q.is_empty());
        assert_eq!(q.display(), "");
    }

    #[test]
    fn punctuation_only_is_empty() {
        let q = normalize(" - . ").unwrap();
        assert!(q.is_empty());
    }

    #[test]
    fn exactly_max_length_is_accepted() {
        let raw = "a".repeat(MAX_QUERY_CHARS);
        assert!(normalize(&raw).is_ok());
    }

    #[test]
    fn over_max_length_is_rejected_before_stripping() {
        // 101 characters, 100 of which would be stripped.
        let raw = format!("a{}", "*".repeat(MAX_QUERY_CHARS));
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(
            err,
            Error::QueryTooLong { len: 101, max: MAX_QUERY_CHARS }
        ));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let raw = "é".repeat(MAX_QUERY_CHARS);
        assert!(raw.len() > MAX_QUERY_CHARS);
        assert!(normalize(&raw).is_ok());
    }

    #[test]
    fn clean_collapses_internal_runs() {
        assert_eq!(clean("a   b\t\tc"), "a b c");
    }
}
