use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

use serde_json::{Value, json};

fn run(data_dir: &Path, args: &[&str]) -> Result<Output, Box<dyn std::error::Error>> {
    let output = Command::new(shelfsearch_bin()?)
        .args(args)
        .env("SHELFSEARCH_DATA_DIR", data_dir)
        .env("SHELFSEARCH_LOG", "warn")
        .env_remove("SHELFSEARCH_DEFAULT_LIMIT")
        .env_remove("SHELFSEARCH_MAX_RESULTS")
        .output()?;
    Ok(output)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
    let output = run(data_dir, args)?;
    assert!(
        output.status.success(),
        "shelfsearch {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(String::from_utf8(output.stdout)?)
}

fn setup_fixture(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let books = json!([
        {
            "id": 1,
            "title": "The Great Gatsby",
            "author": "F. Scott Fitzgerald",
            "categoryId": 1,
            "genre": "Classic",
            "publicationYear": 1925,
            "physicalLocation": "Shelf A3"
        },
        {
            "id": 2,
            "title": "Dune",
            "author": "Frank Herbert",
            "categoryId": 2,
            "genre": "Science Fiction",
            "publicationYear": 1965
        },
        {
            "id": 3,
            "title": "Dune Messiah",
            "author": "Frank Herbert",
            "categoryId": 2,
            "genre": "Science Fiction",
            "publicationYear": 1969
        }
    ]);
    let file = data_dir.join("books.json");
    std::fs::write(&file, serde_json::to_string(&books)?)?;

    let file = file.to_string_lossy().into_owned();
    run_ok(data_dir, &["book", "import", &file])?;
    Ok(())
}

#[test]
fn import_then_search_json() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let stdout = run_ok(tempdir.path(), &["search", "dune", "--json"])?;
    let response: Value = serde_json::from_str(stdout.trim())?;

    assert_eq!(response["query"], "dune");
    assert_eq!(response["resultCount"], 2);
    assert_eq!(response["hasMore"], false);
    assert_eq!(response["sortBy"], "RELEVANCE");
    let results = response["results"].as_array().expect("results array");
    assert_eq!(results[0]["title"], "Dune");
    assert_eq!(results[1]["title"], "Dune Messiah");
    assert!(results[0].get("inUserLibrary").is_none());
    Ok(())
}

#[test]
fn library_membership_shows_in_search() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    run_ok(tempdir.path(), &["library", "add", "--user", "alice", "3"])?;

    let stdout = run_ok(
        tempdir.path(),
        &["search", "dune", "--user", "alice", "--json"],
    )?;
    let response: Value = serde_json::from_str(stdout.trim())?;
    let results = response["results"].as_array().expect("results array");
    assert_eq!(results[0]["inUserLibrary"], false);
    assert_eq!(results[1]["inUserLibrary"], true);
    Ok(())
}

#[test]
fn add_book_and_list_categories() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;

    run_ok(tempdir.path(), &["category", "add", "7", "Poetry"])?;
    run_ok(
        tempdir.path(),
        &["book", "add", "Leaves of Grass", "Walt Whitman", "-c", "7", "--year", "1855"],
    )?;

    let stdout = run_ok(tempdir.path(), &["search", "poetry", "--json"])?;
    let response: Value = serde_json::from_str(stdout.trim())?;
    assert_eq!(response["results"][0]["title"], "Leaves of Grass");
    assert_eq!(response["results"][0]["genre"], "Poetry");

    let stdout = run_ok(tempdir.path(), &["category", "list", "--json"])?;
    let categories: Value = serde_json::from_str(stdout.trim())?;
    assert_eq!(categories[0]["name"], "Poetry");
    Ok(())
}

#[test]
fn invalid_requests_fail() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let output = run(
        tempdir.path(),
        &["search", "--year-from", "2020", "--year-to", "2010"],
    )?;
    assert!(!output.status.success());

    let output = run(tempdir.path(), &["search", "dune", "-n", "51"])?;
    assert!(!output.status.success());

    let output = run(tempdir.path(), &["config", "set", "max_results", "500"])?;
    assert!(!output.status.success());
    Ok(())
}

#[test]
fn config_setting_limits_page_size() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    run_ok(tempdir.path(), &["config", "set", "default_limit", "1"])?;

    let stdout = run_ok(tempdir.path(), &["search", "--json"])?;
    let response: Value = serde_json::from_str(stdout.trim())?;
    assert_eq!(response["resultCount"], 1);
    assert_eq!(response["totalResults"], 3);
    assert_eq!(response["hasMore"], true);
    assert_eq!(response["results"][0]["title"], "Dune");
    Ok(())
}

#[test]
fn status_reports_counts() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let stdout = run_ok(tempdir.path(), &["status", "--json"])?;
    let status: Value = serde_json::from_str(stdout.trim())?;
    assert_eq!(status["books"], 3);
    assert_eq!(status["categories"], 2);
    assert_eq!(status["libraryEntries"], 0);
    Ok(())
}

fn shelfsearch_bin() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(bin) = option_env!("CARGO_BIN_EXE_shelfsearch") {
        return Ok(PathBuf::from(bin));
    }

    let mut path = std::env::current_exe()?;
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("shelfsearch");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    Ok(path)
}
