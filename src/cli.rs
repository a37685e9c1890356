use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::{
    book::{BookId, CategoryId},
    filter::SearchFilters,
    ranker::{SortBy, SortOrder},
};

#[derive(Debug, Parser)]
#[command(
    name = "shelfsearch",
    about = "Search and rank the books in your catalog"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the catalog
    Search(SearchArgs),
    /// Manage books in the catalog
    Book {
        #[command(subcommand)]
        action: BookAction,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage a user's personal library
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },
    /// Show or change search settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show catalog status and statistics
    Status(StatusArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query; omit to list the catalog
    #[arg(default_value = "")]
    pub query: String,

    /// Number of results to return (default from config)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Order results by
    #[arg(long, value_enum, default_value_t = SortBy::Relevance)]
    pub sort: SortBy,

    /// Direction for field sorts; relevance is always best-first
    #[arg(long, value_enum, default_value_t = SortOrder::Asc)]
    pub order: SortOrder,

    /// Restrict to a category id
    #[arg(short = 'c', long)]
    pub category: Option<CategoryId>,

    /// Earliest publication year (inclusive)
    #[arg(long)]
    pub year_from: Option<i32>,

    /// Latest publication year (inclusive)
    #[arg(long)]
    pub year_to: Option<i32>,

    /// Minimum average rating, 0 to 5
    #[arg(long)]
    pub min_rating: Option<f32>,

    /// Exact shelf location
    #[arg(long)]
    pub location: Option<String>,

    /// Flag books already in this user's library
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            category_id: self.category,
            year_from: self.year_from,
            year_to: self.year_to,
            min_rating: self.min_rating,
            physical_location: self.location.clone(),
        }
    }
}

// -- Book subcommands --

#[derive(Debug, Subcommand)]
pub enum BookAction {
    /// Add a single book
    Add(BookAddArgs),
    /// Import books from a JSON array file
    Import {
        /// Path to the JSON file
        path: PathBuf,
    },
    /// Remove a book by id
    Remove {
        id: BookId,
    },
    /// List every book in the catalog
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Parser)]
pub struct BookAddArgs {
    pub title: String,

    pub author: String,

    /// Category id; must already exist
    #[arg(short = 'c', long)]
    pub category: Option<CategoryId>,

    #[arg(long)]
    pub isbn: Option<String>,

    #[arg(long)]
    pub publisher: Option<String>,

    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long)]
    pub description: Option<String>,

    /// Shelf location
    #[arg(long)]
    pub location: Option<String>,
}

// -- Category subcommands --

#[derive(Debug, Subcommand)]
pub enum CategoryAction {
    /// Add or rename a category
    Add {
        id: CategoryId,
        name: String,
    },
    /// Remove a category
    Remove {
        id: CategoryId,
    },
    /// List all categories
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

// -- Library subcommands --

#[derive(Debug, Subcommand)]
pub enum LibraryAction {
    /// Add a book to a user's library
    Add {
        #[arg(short = 'u', long)]
        user: String,
        book: BookId,
    },
    /// Remove a book from a user's library
    Remove {
        #[arg(short = 'u', long)]
        user: String,
        book: BookId,
    },
    /// List the books in a user's library
    List {
        #[arg(short = 'u', long)]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

// -- Config --

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the resolved settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Persist a setting in the catalog
    Set {
        key: String,
        value: String,
    },
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "shelfsearch",
            &mut std::io::stdout(),
        );
    }
}
