//! Relevance scoring.
//!
//! A score is the sum of three layers, each strictly dominating the next:
//!
//! | Layer | Contribution |
//! |-------|--------------|
//! | Coverage | [`COVERAGE_WEIGHT`] per distinct query term found anywhere |
//! | Exact | title 64, author 32, genre 16, ISBN 16 |
//! | Partial | `weight * matched_terms / total_terms` per field |
//!
//! Partial weights are title 3.0, author 2.0, genre 1.5, publisher 1.0,
//! ISBN 1.0 and description 0.5. Everything below the coverage layer adds
//! up to at most [`MAX_FIELD_CONTRIBUTION`], which stays under one unit of
//! coverage. A record matching more distinct terms therefore always
//! outranks one matching fewer, whatever fields the hits landed in.
//!
//! Scores only order candidates. They never leave the engine.

use crate::{
    book::BookRecord,
    matcher::{Field, FieldMatches},
};

pub const COVERAGE_WEIGHT: f64 = 256.0;

pub const EXACT_TITLE_WEIGHT: f64 = 64.0;
pub const EXACT_AUTHOR_WEIGHT: f64 = 32.0;
pub const EXACT_GENRE_WEIGHT: f64 = 16.0;
pub const EXACT_ISBN_WEIGHT: f64 = 16.0;

/// Upper bound of everything except coverage.
pub const MAX_FIELD_CONTRIBUTION: f64 = EXACT_TITLE_WEIGHT
    + EXACT_AUTHOR_WEIGHT
    + EXACT_GENRE_WEIGHT
    + EXACT_ISBN_WEIGHT
    + 9.0;

/// Weight of a partial (substring) hit in `field`.
pub fn partial_weight(field: Field) -> f64 {
    match field {
        Field::Title => 3.0,
        Field::Author => 2.0,
        Field::Genre => 1.5,
        Field::Publisher => 1.0,
        Field::Isbn => 1.0,
        Field::Description => 0.5,
    }
}

/// A matched record with its score. Lives for one search only.
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub book: &'a BookRecord,
    pub score: f64,
    pub matches: FieldMatches,
}

/// Score one set of matches. Pure and deterministic.
pub fn score(matches: &FieldMatches) -> f64 {
    // An exact ISBN hit accounts for the whole query even when the stored
    // value's separators defeat the per-term substring check.
    let covered = if matches.exact.isbn {
        matches.term_count().max(matches.distinct_terms())
    } else {
        matches.distinct_terms()
    };
    let coverage = f64::from(covered) * COVERAGE_WEIGHT;

    let exact = &matches.exact;
    let mut exact_score = 0.0;
    if exact.title {
        exact_score += EXACT_TITLE_WEIGHT;
    }
    if exact.author {
        exact_score += EXACT_AUTHOR_WEIGHT;
    }
    if exact.genre {
        exact_score += EXACT_GENRE_WEIGHT;
    }
    if exact.isbn {
        exact_score += EXACT_ISBN_WEIGHT;
    }

    let total_terms = f64::from(matches.term_count().max(1));
    let partial: f64 = matches
        .fields()
        .map(|field| {
            partial_weight(field) * f64::from(matches.terms_in(field))
                / total_terms
        })
        .sum();

    coverage + exact_score + partial
}

pub fn score_candidate(
    book: &BookRecord,
    matches: FieldMatches,
) -> ScoredCandidate<'_> {
    ScoredCandidate {
        book,
        score: score(&matches),
        matches,
    }
}
