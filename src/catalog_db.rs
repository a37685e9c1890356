use std::{collections::HashSet, path::Path};

use redb::{
    Database,
    ReadableDatabase,
    ReadableTable,
    ReadableTableMetadata,
    TableDefinition,
};

use crate::{
    book::{BookId, BookRecord, Category, CategoryId},
    error::Result,
    filter::SearchFilters,
    membership::MembershipOracle,
    source::BookSource,
};

const BOOKS: TableDefinition<u64, &[u8]> = TableDefinition::new("books");
const CATEGORIES: TableDefinition<u64, &str> = TableDefinition::new("categories");
/// (user id, book id) -> unix time the book was added to the library.
const LIBRARIES: TableDefinition<(&str, u64), u64> =
    TableDefinition::new("libraries");
const SETTINGS: TableDefinition<&str, &str> = TableDefinition::new("settings");

/// The persistent catalog: books, categories, personal libraries and
/// settings in one redb file.
pub struct CatalogDb {
    db: Database,
}

impl CatalogDb {
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        // Ensure all tables exist by opening them in a write transaction.
        let txn = db.begin_write()?;
        txn.open_table(BOOKS)?;
        txn.open_table(CATEGORIES)?;
        txn.open_table(LIBRARIES)?;
        txn.open_table(SETTINGS)?;
        txn.commit()?;

        Ok(Self { db })
    }

    // -- Books --

    pub fn put_book(&self, book: &BookRecord) -> Result<()> {
        let bytes = serde_json::to_vec(book)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(BOOKS)?;
            table.insert(book.id, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Store many books in a single transaction.
    pub fn put_books(&self, books: &[BookRecord]) -> Result<usize> {
        if books.is_empty() {
            return Ok(0);
        }
        let encoded = books
            .iter()
            .map(|b| Ok((b.id, serde_json::to_vec(b)?)))
            .collect::<Result<Vec<_>>>()?;

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(BOOKS)?;
            for (id, bytes) in &encoded {
                table.insert(*id, bytes.as_slice())?;
            }
        }
        txn.commit()?;
        Ok(encoded.len())
    }

    pub fn get_book(&self, id: BookId) -> Result<Option<BookRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(BOOKS)?;
        match table.get(id)? {
            Some(v) => Ok(Some(serde_json::from_slice(v.value())?)),
            None => Ok(None),
        }
    }

    /// Remove a book along with every library entry pointing at it.
    pub fn remove_book(&self, id: BookId) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut books = txn.open_table(BOOKS)?;
            let removed = books.remove(id)?.is_some();

            let mut libraries = txn.open_table(LIBRARIES)?;
            let mut stale = Vec::new();
            for entry in libraries.iter()? {
                let (k, _v) = entry?;
                let (user, book) = k.value();
                if book == id {
                    stale.push(user.to_string());
                }
            }
            for user in &stale {
                libraries.remove((user.as_str(), id))?;
            }
            removed
        };
        txn.commit()?;
        Ok(removed)
    }

    /// All books in id order.
    pub fn list_books(&self) -> Result<Vec<BookRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(BOOKS)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (_k, v) = entry?;
            result.push(serde_json::from_slice(v.value())?);
        }
        Ok(result)
    }

    /// One past the highest id in use.
    pub fn next_book_id(&self) -> Result<BookId> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(BOOKS)?;
        Ok(table.last()?.map(|(k, _v)| k.value() + 1).unwrap_or(1))
    }

    pub fn book_count(&self) -> Result<u64> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(BOOKS)?;
        Ok(table.len()?)
    }

    // -- Categories --

    pub fn set_category(&self, id: CategoryId, name: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CATEGORIES)?;
            table.insert(id, name)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_category(&self, id: CategoryId) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CATEGORIES)?;
        Ok(table.get(id)?.map(|v| v.value().to_string()))
    }

    pub fn remove_category(&self, id: CategoryId) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(CATEGORIES)?;
            table.remove(id)?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CATEGORIES)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (k, v) = entry?;
            result.push(Category {
                id: k.value(),
                name: v.value().to_string(),
            });
        }
        Ok(result)
    }

    // -- Libraries --

    pub fn add_to_library(
        &self,
        user_id: &str,
        book_id: BookId,
        added_at: u64,
    ) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(LIBRARIES)?;
            table.insert((user_id, book_id), added_at)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn remove_from_library(
        &self,
        user_id: &str,
        book_id: BookId,
    ) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(LIBRARIES)?;
            table.remove((user_id, book_id))?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }

    /// Book ids in a user's library, in id order.
    pub fn list_library(&self, user_id: &str) -> Result<Vec<BookId>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(LIBRARIES)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (k, _v) = entry?;
            let (user, book) = k.value();
            if user == user_id {
                result.push(book);
            }
        }
        Ok(result)
    }

    pub fn library_entry_count(&self) -> Result<u64> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(LIBRARIES)?;
        Ok(table.len()?)
    }

    // -- Settings --

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SETTINGS)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SETTINGS)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    pub fn list_settings(&self) -> Result<Vec<(String, String)>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SETTINGS)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (k, v) = entry?;
            result.push((k.value().to_string(), v.value().to_string()));
        }
        Ok(result)
    }
}

impl BookSource for CatalogDb {
    fn fetch_candidates(&self, filters: &SearchFilters) -> Result<Vec<BookRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(BOOKS)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (_k, v) = entry?;
            let book: BookRecord = serde_json::from_slice(v.value())?;
            if filters.matches(&book) {
                result.push(book);
            }
        }
        Ok(result)
    }

    fn category_exists(&self, id: CategoryId) -> Result<bool> {
        Ok(self.get_category(id)?.is_some())
    }
}

impl MembershipOracle for CatalogDb {
    fn is_owned(&self, user_id: &str, book_id: BookId) -> Result<bool> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(LIBRARIES)?;
        Ok(table.get((user_id, book_id))?.is_some())
    }

    /// Point lookups for the page's ids inside one read transaction.
    fn owned_among(
        &self,
        user_id: &str,
        book_ids: &[BookId],
    ) -> Result<HashSet<BookId>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(LIBRARIES)?;
        let mut owned = HashSet::new();
        for &id in book_ids {
            if table.get((user_id, id))?.is_some() {
                owned.insert(id);
            }
        }
        Ok(owned)
    }
}

impl std::fmt::Debug for CatalogDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogDb").finish_non_exhaustive()
    }
}

/// Current time as unix seconds.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
