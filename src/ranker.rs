//! Ordering and truncation.
//!
//! Every ordering ends with the same tie-break: lowercased title ascending,
//! then id ascending. Identical inputs therefore always come back in the
//! same order, which pagination and tests rely on.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{book::BookRecord, scorer::ScoredCandidate};

/// Hard upper bound on results returned by one search.
pub const RESULT_CEILING: usize = 50;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortBy {
    #[default]
    Relevance,
    Title,
    Author,
    #[value(name = "year")]
    PublicationYear,
    #[value(name = "added")]
    DateAdded,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// A truncated slice of an ordered result list.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of matches before truncation.
    pub total: usize,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.total > self.items.len()
    }
}

/// Keep the first `limit` items, never more than [`RESULT_CEILING`].
pub fn truncate<T>(mut items: Vec<T>, limit: usize) -> Page<T> {
    let total = items.len();
    items.truncate(limit.min(RESULT_CEILING));
    Page { items, total }
}

fn tie_break(a: &(String, &BookRecord), b: &(String, &BookRecord)) -> Ordering {
    a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id))
}

/// Order scored candidates by score descending, then title.
pub fn rank_by_relevance(
    candidates: Vec<ScoredCandidate<'_>>,
) -> Vec<ScoredCandidate<'_>> {
    let mut keyed: Vec<(String, ScoredCandidate<'_>)> = candidates
        .into_iter()
        .map(|c| (c.book.title_key(), c))
        .collect();

    keyed.sort_by(|(a_title, a), (b_title, b)| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a_title.cmp(b_title))
            .then_with(|| a.book.id.cmp(&b.book.id))
    });

    keyed.into_iter().map(|(_, c)| c).collect()
}

/// Order records on a field without scoring.
///
/// [`SortBy::Relevance`] has no field to sort on here and falls back to
/// plain alphabetical order, which is how an empty query is listed.
/// Records missing a publication year sort last in either direction.
pub fn sort_records<'a>(
    books: Vec<&'a BookRecord>,
    sort_by: SortBy,
    order: SortOrder,
) -> Vec<&'a BookRecord> {
    let mut keyed: Vec<(String, &BookRecord)> =
        books.into_iter().map(|b| (b.title_key(), b)).collect();

    match sort_by {
        SortBy::Relevance => keyed.sort_by(tie_break),
        SortBy::Title => {
            keyed.sort_by(|a, b| order.apply(a.0.cmp(&b.0)).then_with(|| tie_break(a, b)))
        }
        SortBy::Author => {
            let mut with_author: Vec<(String, (String, &BookRecord))> = keyed
                .into_iter()
                .map(|k| (k.1.author.to_lowercase(), k))
                .collect();
            with_author.sort_by(|a, b| {
                order.apply(a.0.cmp(&b.0)).then_with(|| tie_break(&a.1, &b.1))
            });
            keyed = with_author.into_iter().map(|(_, k)| k).collect();
        }
        SortBy::PublicationYear => keyed.sort_by(|a, b| {
            match (a.1.publication_year, b.1.publication_year) {
                (Some(x), Some(y)) => order.apply(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| tie_break(a, b))
        }),
        SortBy::DateAdded => keyed.sort_by(|a, b| {
            order
                .apply(a.1.date_added.cmp(&b.1.date_added))
                .then_with(|| tie_break(a, b))
        }),
    }

    keyed.into_iter().map(|(_, b)| b).collect()
}
