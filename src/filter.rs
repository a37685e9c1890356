//! Structural (non-text) filters.
//!
//! Every filter is optional and they combine with AND. They are validated
//! before the engine touches any data and apply the same way with or
//! without a text query.

use serde::{Deserialize, Serialize};

use crate::{
    book::{BookRecord, CategoryId},
    error::{Error, Result},
};

pub const MIN_RATING: f32 = 0.0;
pub const MAX_RATING: f32 = 5.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub category_id: Option<CategoryId>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub min_rating: Option<f32>,
    pub physical_location: Option<String>,
}

impl SearchFilters {
    /// Reject contradictory or out-of-range filters. Bounds are never
    /// swapped or clamped.
    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.year_from, self.year_to)
            && from > to
        {
            return Err(Error::InvalidRange { from, to });
        }

        if let Some(rating) = self.min_rating
            && !(MIN_RATING..=MAX_RATING).contains(&rating)
        {
            // NaN fails the range check too.
            return Err(Error::InvalidRating(rating));
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.year_from.is_none()
            && self.year_to.is_none()
            && self.min_rating.is_none()
            && self.physical_location.is_none()
    }

    /// True when `book` satisfies every filter that is set.
    ///
    /// Records without a year fail any year bound and unrated records fail
    /// a rating floor.
    pub fn matches(&self, book: &BookRecord) -> bool {
        if let Some(category) = self.category_id
            && book.category_id != Some(category)
        {
            return false;
        }

        if self.year_from.is_some() || self.year_to.is_some() {
            let Some(year) = book.publication_year else {
                return false;
            };
            if self.year_from.is_some_and(|from| year < from)
                || self.year_to.is_some_and(|to| year > to)
            {
                return false;
            }
        }

        if let Some(min) = self.min_rating {
            match book.average_rating {
                Some(rating) if rating >= min => {}
                _ => return false,
            }
        }

        if let Some(ref location) = self.physical_location {
            match book.physical_location {
                Some(ref loc) if loc.to_lowercase() == location.to_lowercase() => {}
                _ => return false,
            }
        }

        true
    }

    /// Keep only the records that pass every filter, preserving order.
    pub fn apply<'a>(
        &self,
        books: &'a [BookRecord],
    ) -> impl Iterator<Item = &'a BookRecord> {
        books.iter().filter(move |b| self.matches(b))
    }
}
