//! Where candidate books come from.
//!
//! The engine only reads through [`BookSource`]. [`MemoryCatalog`] is a
//! plain in-memory implementation for embedding and tests; the on-disk
//! store lives in [`crate::catalog_db`].

use std::collections::{BTreeMap, HashSet};

use crate::{
    book::{BookId, BookRecord, Category, CategoryId},
    error::Result,
    filter::SearchFilters,
    membership::MembershipOracle,
};

/// Read-only access to the catalog.
pub trait BookSource {
    /// Return every book that may satisfy `filters`.
    ///
    /// Applying the filters here is optional; the engine re-applies them to
    /// whatever comes back.
    fn fetch_candidates(&self, filters: &SearchFilters) -> Result<Vec<BookRecord>>;

    fn category_exists(&self, id: CategoryId) -> Result<bool>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    books: Vec<BookRecord>,
    categories: BTreeMap<CategoryId, String>,
    libraries: HashSet<(String, BookId)>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(books: impl IntoIterator<Item = BookRecord>) -> Self {
        let mut catalog = Self::new();
        for book in books {
            catalog.add_book(book);
        }
        catalog
    }

    /// Insert a book, registering its category if it names one.
    pub fn add_book(&mut self, book: BookRecord) {
        if let (Some(id), Some(name)) = (book.category_id, book.genre.as_ref()) {
            self.categories.entry(id).or_insert_with(|| name.clone());
        }
        self.books.retain(|b| b.id != book.id);
        self.books.push(book);
    }

    pub fn add_category(&mut self, category: Category) {
        self.categories.insert(category.id, category.name);
    }

    pub fn add_to_library(&mut self, user_id: &str, book_id: BookId) {
        self.libraries.insert((user_id.to_string(), book_id));
    }

    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .map(|(&id, name)| Category {
                id,
                name: name.clone(),
            })
            .collect()
    }
}

impl BookSource for MemoryCatalog {
    fn fetch_candidates(&self, filters: &SearchFilters) -> Result<Vec<BookRecord>> {
        Ok(filters.apply(&self.books).cloned().collect())
    }

    fn category_exists(&self, id: CategoryId) -> Result<bool> {
        Ok(self.categories.contains_key(&id))
    }
}

impl MembershipOracle for MemoryCatalog {
    fn is_owned(&self, user_id: &str, book_id: BookId) -> Result<bool> {
        Ok(self.libraries.contains(&(user_id.to_string(), book_id)))
    }
}
