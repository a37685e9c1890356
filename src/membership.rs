//! "Already in your library" annotation.
//!
//! Runs on the final, truncated page only, so the number of lookups is
//! bounded by the page size. It never feeds back into scoring or order.

use std::collections::HashSet;

use crate::{book::BookId, error::Result};

/// Who is asking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Caller {
    #[default]
    Anonymous,
    User(String),
}

impl Caller {
    pub fn user(id: impl Into<String>) -> Self {
        Caller::User(id.into())
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::User(id) => Some(id),
        }
    }
}

/// Answers whether a user owns a book.
pub trait MembershipOracle {
    fn is_owned(&self, user_id: &str, book_id: BookId) -> Result<bool>;

    /// The subset of `book_ids` the user owns. Implementations backed by a
    /// store should override this to answer in one round trip.
    fn owned_among(
        &self,
        user_id: &str,
        book_ids: &[BookId],
    ) -> Result<HashSet<BookId>> {
        let mut owned = HashSet::new();
        for &id in book_ids {
            if self.is_owned(user_id, id)? {
                owned.insert(id);
            }
        }
        Ok(owned)
    }
}

/// Ownership flags for a page of results, in page order.
///
/// Anonymous callers get `None` for every entry so the field can be left
/// out of the response.
pub fn annotate(
    caller: &Caller,
    page: &[BookId],
    oracle: &dyn MembershipOracle,
) -> Result<Vec<Option<bool>>> {
    let Some(user) = caller.user_id() else {
        return Ok(vec![None; page.len()]);
    };

    if page.is_empty() {
        return Ok(Vec::new());
    }

    let owned = oracle.owned_among(user, page)?;
    Ok(page.iter().map(|id| Some(owned.contains(id))).collect())
}
