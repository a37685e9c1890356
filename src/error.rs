use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("query is {len} characters long; the maximum is {max}")]
    QueryTooLong { len: usize, max: usize },

    #[error("limit must be between 1 and {max}, got {limit}")]
    InvalidLimit { limit: usize, max: usize },

    #[error("invalid year range: year_from {from} is after year_to {to}")]
    InvalidRange { from: i32, to: i32 },

    #[error("minimum rating must be between 0 and 5, got {0}")]
    InvalidRating(f32),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("book source unavailable: {0}")]
    Dependency(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Redb(#[from] redb::Error),

    #[error("database open error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("database storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("database transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("database table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("database commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("data directory does not exist and could not be created: {0}")]
    DataDir(PathBuf),
}

impl Error {
    /// True for errors raised while checking a request, before any data
    /// access happens.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::QueryTooLong { .. }
                | Error::InvalidLimit { .. }
                | Error::InvalidRange { .. }
                | Error::InvalidRating(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_grouped() {
        assert!(Error::QueryTooLong { len: 101, max: 100 }.is_validation());
        assert!(Error::InvalidLimit { limit: 0, max: 50 }.is_validation());
        assert!(Error::InvalidRange { from: 2020, to: 2010 }.is_validation());
        assert!(Error::InvalidRating(6.0).is_validation());

        assert!(!Error::Dependency("down".into()).is_validation());
        assert!(
            !Error::NotFound {
                kind: "category",
                name: "7".into()
            }
            .is_validation()
        );
    }

    #[test]
    fn messages_are_actionable() {
        let err = Error::InvalidRange { from: 2020, to: 2010 };
        assert_eq!(
            err.to_string(),
            "invalid year range: year_from 2020 is after year_to 2010"
        );

        let err = Error::QueryTooLong { len: 101, max: 100 };
        assert!(err.to_string().contains("101"));
    }
}
