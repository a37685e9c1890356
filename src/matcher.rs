//! Decide which query terms hit which book fields.

use crate::{
    book::BookRecord,
    query::{NormalizedQuery, clean},
};

/// Book attributes the free-text query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Title,
    Author,
    Genre,
    Isbn,
    Publisher,
    Description,
}

const FIELD_COUNT: usize = 6;

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Title,
        Field::Author,
        Field::Genre,
        Field::Isbn,
        Field::Publisher,
        Field::Description,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn value(self, book: &BookRecord) -> Option<&str> {
        match self {
            Field::Title => Some(&book.title),
            Field::Author => Some(&book.author),
            Field::Genre => book.genre.as_deref(),
            Field::Isbn => book.isbn.as_deref(),
            Field::Publisher => book.publisher.as_deref(),
            Field::Description => book.description.as_deref(),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Title => write!(f, "title"),
            Field::Author => write!(f, "author"),
            Field::Genre => write!(f, "genre"),
            Field::Isbn => write!(f, "isbn"),
            Field::Publisher => write!(f, "publisher"),
            Field::Description => write!(f, "description"),
        }
    }
}

/// Whole-value matches, checked separately from per-term substrings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactMatches {
    pub title: bool,
    pub author: bool,
    pub genre: bool,
    pub isbn: bool,
}

impl ExactMatches {
    fn any(&self) -> bool {
        self.title || self.author || self.genre || self.isbn
    }
}

/// Which terms matched which fields for one record.
///
/// Terms are tracked as bits by their position in
/// [`NormalizedQuery::terms`]. The length cap on queries keeps the term
/// count well under 64.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMatches {
    per_field: [u64; FIELD_COUNT],
    term_count: u32,
    pub exact: ExactMatches,
}

impl FieldMatches {
    /// Number of query terms found in `field`.
    pub fn terms_in(&self, field: Field) -> u32 {
        self.per_field[field.index()].count_ones()
    }

    /// Number of distinct query terms found in any field.
    pub fn distinct_terms(&self) -> u32 {
        self.per_field
            .iter()
            .fold(0u64, |acc, mask| acc | mask)
            .count_ones()
    }

    /// Total number of terms in the query this was matched against.
    pub fn term_count(&self) -> u32 {
        self.term_count
    }

    /// Fields with at least one term hit, in [`Field::ALL`] order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL
            .into_iter()
            .filter(|f| self.per_field[f.index()] != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.distinct_terms() == 0 && !self.exact.any()
    }
}

/// Match a record against a non-empty query.
///
/// Returns `None` when no term hits any field and there is no exact ISBN
/// match; such records are dropped, never scored.
pub fn match_record(
    query: &NormalizedQuery,
    book: &BookRecord,
) -> Option<FieldMatches> {
    let terms = query.terms();
    let mut matches = FieldMatches {
        term_count: terms.len().min(64) as u32,
        ..Default::default()
    };

    for field in Field::ALL {
        let Some(value) = field.value(book) else {
            continue;
        };
        // Same cleaning as the query, so a stripped character never splits
        // a term the query itself contains.
        let haystack = clean(value).to_lowercase();
        let mut mask = 0u64;
        for (i, term) in terms.iter().take(64).enumerate() {
            if haystack.contains(term.as_str()) {
                mask |= 1 << i;
            }
        }
        matches.per_field[field.index()] = mask;
    }

    let normalized = query.normalized();
    matches.exact = ExactMatches {
        title: exact_eq(normalized, &book.title),
        author: exact_eq(normalized, &book.author),
        genre: book
            .genre
            .as_deref()
            .is_some_and(|g| exact_eq(normalized, g)),
        isbn: book
            .isbn
            .as_deref()
            .is_some_and(|isbn| isbn_eq(normalized, isbn)),
    };

    (!matches.is_empty()).then_some(matches)
}

fn exact_eq(normalized_query: &str, value: &str) -> bool {
    !normalized_query.is_empty()
        && clean(value).to_lowercase() == normalized_query
}

/// ISBNs are compared with separators removed, so "978-0-7432-7356-5"
/// finds a record stored as "9780743273565".
pub fn isbn_eq(query: &str, isbn: &str) -> bool {
    let q = compact_isbn(query);
    !q.is_empty() && q == compact_isbn(isbn)
}

fn compact_isbn(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::normalize;

    fn gatsby() -> BookRecord {
        BookRecord::new(1, "The Great Gatsby", "F. Scott Fitzgerald")
            .with_genre("Classic")
            .with_isbn("978-0-7432-7356-5")
            .with_publisher("Scribner")
            .with_description("A story of wealth and longing on Long Island.")
    }

    #[test]
    fn partial_word_matches_title() {
        let q = normalize("gats").unwrap();
        let m = match_record(&q, &gatsby()).unwrap();
        assert_eq!(m.terms_in(Field::Title), 1);
        assert_eq!(m.distinct_terms(), 1);
        assert!(!m.exact.title);
    }

    #[test]
    fn unmatched_record_is_excluded() {
        let q = normalize("asimov").unwrap();
        assert!(match_record(&q, &gatsby()).is_none());
    }

    #[test]
    fn one_term_is_enough_for_inclusion() {
        let q = normalize("gatsby foundation robots").unwrap();
        let m = match_record(&q, &gatsby()).unwrap();
        assert_eq!(m.distinct_terms(), 1);
        assert_eq!(m.term_count(), 3);
    }

    #[test]
    fn terms_across_fields_are_tracked_separately() {
        let q = normalize("gatsby scribner island").unwrap();
        let m = match_record(&q, &gatsby()).unwrap();
        assert_eq!(m.terms_in(Field::Title), 1);
        assert_eq!(m.terms_in(Field::Publisher), 1);
        assert_eq!(m.terms_in(Field::Description), 1);
        assert_eq!(m.distinct_terms(), 3);
        assert_eq!(
            m.fields().collect::<Vec<_>>(),
            vec![Field::Title, Field::Publisher, Field::Description]
        );
    }

    #[test]
    fn same_term_in_two_fields_counts_once() {
        let book = BookRecord::new(2, "Dune", "Frank Herbert")
            .with_description("Dune is a desert planet.");
        let q = normalize("dune").unwrap();
        let m = match_record(&q, &book).unwrap();
        assert_eq!(m.distinct_terms(), 1);
        assert_eq!(m.terms_in(Field::Title), 1);
        assert_eq!(m.terms_in(Field::Description), 1);
    }

    #[test]
    fn exact_title_ignores_case_and_spacing() {
        let q = normalize("the   GREAT gatsby").unwrap();
        let m = match_record(&q, &gatsby()).unwrap();
        assert!(m.exact.title);
        assert!(!m.exact.author);
    }

    #[test]
    fn exact_author_and_genre() {
        let q = normalize("f. scott fitzgerald").unwrap();
        assert!(match_record(&q, &gatsby()).unwrap().exact.author);

        let q = normalize("classic").unwrap();
        assert!(match_record(&q, &gatsby()).unwrap().exact.genre);
    }

    #[test]
    fn isbn_exact_match_ignores_separators() {
        let q = normalize("9780743273565").unwrap();
        let m = match_record(&q, &gatsby()).unwrap();
        assert!(m.exact.isbn);
        // The stored value has hyphens, so the substring rule misses.
        assert_eq!(m.terms_in(Field::Isbn), 0);
    }

    #[test]
    fn isbn_substring_still_matches() {
        let q = normalize("7432").unwrap();
        let m = match_record(&q, &gatsby()).unwrap();
        assert_eq!(m.terms_in(Field::Isbn), 1);
        assert!(!m.exact.isbn);
    }

    #[test]
    fn missing_optional_fields_do_not_match() {
        let book = BookRecord::new(3, "Untitled", "Anonymous");
        let q = normalize("scribner").unwrap();
        assert!(match_record(&q, &book).is_none());
    }

    #[test]
    fn stripped_characters_inside_a_field_still_match() {
        let book = BookRecord::new(4, "Ke$ha Biography", "Unknown");
        let q = normalize("Ke$ha Biography").unwrap();
        let m = match_record(&q, &book).unwrap();
        assert!(m.exact.title);
        assert_eq!(m.terms_in(Field::Title), 2);
        assert_eq!(m.distinct_terms(), 2);
    }

    #[test]
    fn isbn_eq_rejects_empty() {
        assert!(!isbn_eq("", ""));
        assert!(!isbn_eq("-", "-"));
    }
}
