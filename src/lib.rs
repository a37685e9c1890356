//! shelfsearch - relevance-ranked search over a personal book catalog.
//!
//! A query is cleaned and split into terms, matched against the title,
//! author, genre, ISBN, publisher and description of every candidate
//! book, scored so that covering more query terms always wins, and
//! returned as a bounded page. Books the caller already owns are
//! flagged when a user is named.
//!
//! # Quick start
//!
//! ```no_run
//! use shelfsearch::{CatalogDb, DataDir, SearchConfig, SearchEngine, SearchRequest};
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let catalog = CatalogDb::open(&data_dir.catalog_db()).unwrap();
//! let config = SearchConfig::resolve(&catalog).unwrap();
//!
//! let engine = SearchEngine::new(&catalog, &catalog).with_config(config);
//! let response = engine
//!     .execute(&SearchRequest::new("gatsby").with_limit(10))
//!     .unwrap();
//! for r in &response.results {
//!     println!("{} by {}", r.title, r.author);
//! }
//! ```

pub mod book;
pub mod catalog_db;
pub mod cli;
pub mod config;
pub mod data_dir;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod membership;
pub mod query;
pub mod ranker;
pub mod scorer;
pub mod search;
pub mod source;

pub use book::{BookId, BookRecord, Category, CategoryId};
pub use catalog_db::CatalogDb;
pub use config::SearchConfig;
pub use data_dir::DataDir;
pub use error::{Error, Result};
pub use filter::SearchFilters;
pub use membership::{Caller, MembershipOracle};
pub use ranker::{SortBy, SortOrder};
pub use search::{SearchEngine, SearchRequest, SearchResponse, SearchResultItem};
pub use source::{BookSource, MemoryCatalog};
