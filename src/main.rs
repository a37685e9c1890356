use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use shelfsearch::{
    BookRecord,
    CatalogDb,
    DataDir,
    SearchConfig,
    SearchEngine,
    SearchRequest,
    catalog_db::unix_now,
    cli::{
        BookAction,
        BookAddArgs,
        CategoryAction,
        Cli,
        Command,
        ConfigAction,
        LibraryAction,
        SearchArgs,
    },
    config,
    error::{self, Error},
    membership::Caller,
    search,
};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("SHELFSEARCH_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let catalog = CatalogDb::open(&data_dir.catalog_db())?;

    match cli.command {
        Command::Search(args) => cmd_search(&catalog, &args)?,
        Command::Book { action } => match action {
            BookAction::Add(args) => book_add(&catalog, &args)?,
            BookAction::Import { path } => book_import(&catalog, &path)?,
            BookAction::Remove { id } => book_remove(&catalog, id)?,
            BookAction::List { json } => book_list(&catalog, json)?,
        },
        Command::Category { action } => match action {
            CategoryAction::Add { id, name } => {
                catalog.set_category(id, &name)?;
                println!("Set category {id} -> '{name}'");
            }
            CategoryAction::Remove { id } => {
                if !catalog.remove_category(id)? {
                    return Err(Error::NotFound {
                        kind: "category",
                        name: id.to_string(),
                    });
                }
                println!("Removed category {id}");
            }
            CategoryAction::List { json } => category_list(&catalog, json)?,
        },
        Command::Library { action } => match action {
            LibraryAction::Add { user, book } => {
                library_add(&catalog, &user, book)?;
            }
            LibraryAction::Remove { user, book } => {
                if !catalog.remove_from_library(&user, book)? {
                    return Err(Error::NotFound {
                        kind: "library entry",
                        name: format!("{user}/{book}"),
                    });
                }
                println!("Removed book {book} from {user}'s library");
            }
            LibraryAction::List { user, json } => {
                library_list(&catalog, &user, json)?;
            }
        },
        Command::Config { action } => match action {
            ConfigAction::Show { json } => config_show(&catalog, json)?,
            ConfigAction::Set { key, value } => {
                config::validate_setting(&key, &value)?;
                catalog.set_setting(&key, value.trim())?;
                println!("Set {key} = {}", value.trim());
            }
        },
        Command::Status(args) => cmd_status(&catalog, &data_dir, args.json)?,
        Command::Completions(_) => {}
    }

    Ok(())
}

fn cmd_search(catalog: &CatalogDb, args: &SearchArgs) -> error::Result<()> {
    let config = SearchConfig::resolve(catalog)?;
    let engine = SearchEngine::new(catalog, catalog).with_config(config);

    let mut request = SearchRequest::new(args.query.clone())
        .with_sort(args.sort, args.order)
        .with_filters(args.filters());
    request.limit = args.limit;
    if let Some(user) = &args.user {
        request = request.for_caller(Caller::user(user.clone()));
    }

    let response = engine.execute(&request)?;

    if args.json {
        search::format_json(&response)?;
    } else {
        search::format_human(&response);
    }
    Ok(())
}

fn book_add(catalog: &CatalogDb, args: &BookAddArgs) -> error::Result<()> {
    let id = catalog.next_book_id()?;
    let mut book = BookRecord::new(id, &args.title, &args.author)
        .with_date_added(unix_now());

    if let Some(category) = args.category {
        let name = catalog.get_category(category)?.ok_or_else(|| {
            Error::NotFound {
                kind: "category",
                name: category.to_string(),
            }
        })?;
        book = book.with_category(category, name);
    }
    book.isbn = args.isbn.clone();
    book.publisher = args.publisher.clone();
    book.publication_year = args.year;
    book.description = args.description.clone();
    book.physical_location = args.location.clone();

    catalog.put_book(&book)?;
    println!("Added book #{id}: {} by {}", book.title, book.author);
    Ok(())
}

fn book_import(catalog: &CatalogDb, path: &Path) -> error::Result<()> {
    let raw = std::fs::read_to_string(path)?;
    let mut books: Vec<BookRecord> = serde_json::from_str(&raw)?;

    let now = unix_now();
    for book in &mut books {
        if book.date_added == 0 {
            book.date_added = now;
        }
        if let (Some(id), Some(name)) = (book.category_id, book.genre.as_deref())
            && catalog.get_category(id)?.is_none()
        {
            catalog.set_category(id, name)?;
        }
    }

    let count = catalog.put_books(&books)?;
    tracing::info!(count, path = %path.display(), "imported books");
    println!("Imported {count} book(s)");
    Ok(())
}

fn book_remove(catalog: &CatalogDb, id: u64) -> error::Result<()> {
    if !catalog.remove_book(id)? {
        return Err(Error::NotFound {
            kind: "book",
            name: id.to_string(),
        });
    }
    println!("Removed book #{id}");
    Ok(())
}

fn book_list(catalog: &CatalogDb, json: bool) -> error::Result<()> {
    let books = catalog.list_books()?;

    if json {
        println!("{}", serde_json::to_string(&books)?);
    } else if books.is_empty() {
        println!("No books in the catalog.");
    } else {
        for b in &books {
            let year = b
                .publication_year
                .map(|y| format!(" ({y})"))
                .unwrap_or_default();
            println!("#{:<5} {}{year} by {}", b.id, b.title, b.author);
        }
    }
    Ok(())
}

fn category_list(catalog: &CatalogDb, json: bool) -> error::Result<()> {
    let categories = catalog.list_categories()?;

    if json {
        println!("{}", serde_json::to_string(&categories)?);
    } else if categories.is_empty() {
        println!("No categories.");
    } else {
        for c in &categories {
            println!("{:>5}  {}", c.id, c.name);
        }
    }
    Ok(())
}

fn library_add(catalog: &CatalogDb, user: &str, book: u64) -> error::Result<()> {
    let Some(record) = catalog.get_book(book)? else {
        return Err(Error::NotFound {
            kind: "book",
            name: book.to_string(),
        });
    };
    catalog.add_to_library(user, book, unix_now())?;
    println!("Added '{}' to {user}'s library", record.title);
    Ok(())
}

fn library_list(catalog: &CatalogDb, user: &str, json: bool) -> error::Result<()> {
    let mut books = Vec::new();
    for id in catalog.list_library(user)? {
        match catalog.get_book(id)? {
            Some(book) => books.push(book),
            None => tracing::warn!(book = id, user, "library entry for missing book"),
        }
    }

    if json {
        println!("{}", serde_json::to_string(&books)?);
    } else if books.is_empty() {
        println!("{user}'s library is empty.");
    } else {
        for b in &books {
            println!("#{:<5} {} by {}", b.id, b.title, b.author);
        }
    }
    Ok(())
}

fn config_show(catalog: &CatalogDb, json: bool) -> error::Result<()> {
    let resolved = SearchConfig::resolve(catalog)?;

    if json {
        println!("{}", serde_json::to_string(&resolved)?);
    } else {
        println!("{} = {}", config::DEFAULT_LIMIT_KEY, resolved.default_limit);
        println!("{} = {}", config::MAX_RESULTS_KEY, resolved.max_results);
        println!("{} = {}", config::SLOW_QUERY_MS_KEY, resolved.slow_query_ms);
    }
    Ok(())
}

fn cmd_status(
    catalog: &CatalogDb,
    data_dir: &DataDir,
    json: bool,
) -> error::Result<()> {
    let books = catalog.book_count()?;
    let categories = catalog.list_categories()?.len();
    let library_entries = catalog.library_entry_count()?;

    if json {
        let status = serde_json::json!({
            "dataDir": data_dir.root().display().to_string(),
            "books": books,
            "categories": categories,
            "libraryEntries": library_entries,
        });
        println!("{status}");
    } else {
        println!("Data directory: {}", data_dir.root().display());
        println!("Books: {books}");
        println!("Categories: {categories}");
        println!("Library entries: {library_entries}");
    }
    Ok(())
}
