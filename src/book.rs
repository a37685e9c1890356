use serde::{Deserialize, Serialize};

/// Catalog-assigned book identifier.
pub type BookId = u64;

/// Catalog-assigned category identifier.
pub type CategoryId = u64;

/// A single book as held by the catalog.
///
/// Records are plain values: they reference their category by id and carry
/// the category name in `genre` so the matcher never has to chase a
/// relation. A record is never modified while a search is running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub physical_location: Option<String>,
    /// Mean rating on a 0..=5 scale, `None` when nobody has rated the book.
    #[serde(default)]
    pub average_rating: Option<f32>,
    #[serde(default)]
    pub rating_count: u32,
    /// Unix timestamp (seconds) of when the book entered the catalog.
    #[serde(default)]
    pub date_added: u64,
}

impl BookRecord {
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            genre: None,
            category_id: None,
            isbn: None,
            publisher: None,
            publication_year: None,
            description: None,
            page_count: None,
            physical_location: None,
            average_rating: None,
            rating_count: 0,
            date_added: 0,
        }
    }

    pub fn with_category(
        mut self,
        category_id: CategoryId,
        genre: impl Into<String>,
    ) -> Self {
        self.category_id = Some(category_id);
        self.genre = Some(genre.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.publication_year = Some(year);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.physical_location = Some(location.into());
        self
    }

    pub fn with_rating(mut self, average: f32, count: u32) -> Self {
        self.average_rating = Some(average);
        self.rating_count = count;
        self
    }

    pub fn with_date_added(mut self, date_added: u64) -> Self {
        self.date_added = date_added;
        self
    }

    /// Lowercased title, the key every ordering tie-break compares on.
    pub fn title_key(&self) -> String {
        self.title.to_lowercase()
    }
}

/// A named category books can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
