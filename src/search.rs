use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::{
    book::{BookId, BookRecord},
    config::SearchConfig,
    error::{Error, Result},
    filter::SearchFilters,
    matcher::match_record,
    membership::{self, Caller, MembershipOracle},
    query::{self, NormalizedQuery},
    ranker::{self, Page, RESULT_CEILING, SortBy, SortOrder},
    scorer::{self, ScoredCandidate},
    source::BookSource,
};

/// One search request. Built per call and never mutated.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    /// Page size; the configured default applies when unset.
    pub limit: Option<usize>,
    pub filters: SearchFilters,
    pub caller: Caller,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn for_caller(mut self, caller: Caller) -> Self {
        self.caller = caller;
        self
    }
}

/// A result row as handed back to the caller. Carries no score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub publication_year: Option<i32>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub physical_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_user_library: Option<bool>,
}

impl SearchResultItem {
    fn project(book: &BookRecord) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            publication_year: book.publication_year,
            isbn: book.isbn.clone(),
            publisher: book.publisher.clone(),
            physical_location: book.physical_location.clone(),
            in_user_library: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// The cleaned query with the caller's casing.
    pub query: String,
    pub result_count: usize,
    pub total_results: usize,
    pub has_more: bool,
    pub results: Vec<SearchResultItem>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl SearchResponse {
    /// The "no results" state. A normal outcome, not an error.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Which branch of the pipeline a request took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchPath {
    /// No searchable terms: list filtered records without matching.
    EmptyQuery,
    /// Match, score and rank by relevance.
    Relevance,
    /// Match, then order on the requested field without scoring.
    FieldSort,
}

impl SearchPath {
    fn select(query: &NormalizedQuery, sort_by: SortBy) -> Self {
        if query.is_empty() {
            SearchPath::EmptyQuery
        } else if sort_by == SortBy::Relevance {
            SearchPath::Relevance
        } else {
            SearchPath::FieldSort
        }
    }
}

/// Runs searches against a book source and a membership oracle.
///
/// The engine holds no per-request state; one instance can serve any
/// number of independent searches.
pub struct SearchEngine<'a> {
    source: &'a dyn BookSource,
    oracle: &'a dyn MembershipOracle,
    config: SearchConfig,
}

impl<'a> SearchEngine<'a> {
    pub fn new(source: &'a dyn BookSource, oracle: &'a dyn MembershipOracle) -> Self {
        Self {
            source,
            oracle,
            config: SearchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config.clamped();
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Execute the full search pipeline.
    ///
    /// 1. Validate limit, filters and query (no data access before this)
    /// 2. Check a category filter refers to a known category
    /// 3. Fetch candidates and apply the structural filters
    /// 4. Match and score, or list alphabetically for an empty query
    /// 5. Rank and truncate
    /// 6. Annotate the page with library membership
    pub fn execute(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let started = Instant::now();

        let limit = self.effective_limit(request.limit)?;
        request.filters.validate()?;
        let query = query::normalize(&request.query)?;

        if let Some(category) = request.filters.category_id
            && !self
                .source
                .category_exists(category)
                .map_err(dependency_failure)?
        {
            return Err(Error::NotFound {
                kind: "category",
                name: category.to_string(),
            });
        }

        let fetched = self
            .source
            .fetch_candidates(&request.filters)
            .map_err(dependency_failure)?;
        let filtered: Vec<&BookRecord> = request.filters.apply(&fetched).collect();

        let path = SearchPath::select(&query, request.sort_by);
        let page = match path {
            SearchPath::EmptyQuery => ranker::truncate(
                ranker::sort_records(filtered, request.sort_by, request.sort_order),
                limit,
            ),
            SearchPath::Relevance => {
                let ranked = ranker::rank_by_relevance(score_all(&query, &filtered));
                let page = ranker::truncate(ranked, limit);
                Page {
                    items: page.items.into_iter().map(|c| c.book).collect(),
                    total: page.total,
                }
            }
            SearchPath::FieldSort => {
                let matched: Vec<&BookRecord> = filtered
                    .par_iter()
                    .copied()
                    .filter(|book| match_record(&query, book).is_some())
                    .collect();
                ranker::truncate(
                    ranker::sort_records(matched, request.sort_by, request.sort_order),
                    limit,
                )
            }
        };

        let ids: Vec<BookId> = page.items.iter().map(|b| b.id).collect();
        let flags = membership::annotate(&request.caller, &ids, self.oracle)
            .map_err(dependency_failure)?;

        let results: Vec<SearchResultItem> = page
            .items
            .iter()
            .zip(flags)
            .map(|(book, owned)| SearchResultItem {
                in_user_library: owned,
                ..SearchResultItem::project(book)
            })
            .collect();

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(
            ?path,
            fetched = fetched.len(),
            total = page.total,
            returned = results.len(),
            elapsed_ms,
            "search complete"
        );
        if elapsed_ms > self.config.slow_query_ms {
            tracing::warn!(query = query.display(), elapsed_ms, "slow search");
        }

        Ok(SearchResponse {
            query: query.display().to_string(),
            result_count: results.len(),
            total_results: page.total,
            has_more: page.has_more(),
            results,
            sort_by: request.sort_by,
            sort_order: request.sort_order,
        })
    }

    fn effective_limit(&self, requested: Option<usize>) -> Result<usize> {
        let limit = requested.unwrap_or(self.config.default_limit);
        if limit == 0 || limit > RESULT_CEILING {
            return Err(Error::InvalidLimit {
                limit,
                max: RESULT_CEILING,
            });
        }
        Ok(limit.min(self.config.max_results))
    }
}

/// Format a response for terminal output.
pub fn format_human(response: &SearchResponse) {
    if response.is_empty() {
        println!("No results found.");
        return;
    }

    for (rank, r) in response.results.iter().enumerate() {
        let year = r
            .publication_year
            .map(|y| format!(" ({y})"))
            .unwrap_or_default();
        let owned = match r.in_user_library {
            Some(true) => " [in library]",
            _ => "",
        };
        println!("{:>3}. {}{year} by {} #{}{owned}", rank + 1, r.title, r.author, r.id);
        if let Some(location) = &r.physical_location {
            println!("     shelf: {location}");
        }
    }

    if response.has_more {
        println!(
            "\n{} of {} result(s)",
            response.result_count, response.total_results
        );
    } else {
        println!("\n{} result(s)", response.result_count);
    }
}

/// Format a response as a single JSON document.
pub fn format_json(response: &SearchResponse) -> Result<()> {
    println!("{}", serde_json::to_string(response)?);
    Ok(())
}

/// Match and score every record; unmatched records are dropped here.
fn score_all<'b>(
    query: &NormalizedQuery,
    books: &[&'b BookRecord],
) -> Vec<ScoredCandidate<'b>> {
    books
        .par_iter()
        .filter_map(|&book| {
            match_record(query, book).map(|m| scorer::score_candidate(book, m))
        })
        .collect()
}

fn dependency_failure(err: Error) -> Error {
    tracing::error!(error = %err, "catalog lookup failed");
    Error::Dependency(err.to_string())
}
